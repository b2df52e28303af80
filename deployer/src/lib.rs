//! Release automation for the DSpellCheck Notepad++ plugin.
//!
//! This crate bumps the version stamped in the plugin's resource file, builds
//! the x64 and x86 DLLs with CMake, packages them into per-architecture zip
//! archives and publishes the release to the Notepad++ plugin registries. It
//! is used by the `plugin-deployer` CLI binary.
//!
//! # Modules
//!
//! - [`arch`] - The two release architectures
//! - [`builder`] - CMake configure and build per architecture
//! - [`changelog`] - Release-notes excerpts
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `deploy.toml` loading
//! - [`digest`] - MD5 and SHA-256 digests of artefacts
//! - [`error`] - Error types
//! - [`git`] - Commits and tags
//! - [`logging`] - Stderr backend for the `log` facade
//! - [`output`] - Status lines and highlighting
//! - [`packaging`] - Zip archives and debug symbols
//! - [`pipeline`] - Release pipeline orchestration
//! - [`process`] - External command execution
//! - [`registry`] - Minimal-diff patching of registry documents
//! - [`version`] - The product version and the resource file

pub mod arch;
pub mod builder;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod git;
pub mod logging;
pub mod output;
pub mod packaging;
mod pattern;
pub mod pipeline;
pub mod process;
pub mod registry;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
