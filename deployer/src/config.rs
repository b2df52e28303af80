//! Deployer configuration loaded from `deploy.toml`.
//!
//! Every setting has a default matching the DSpellCheck repository layout,
//! so the file is optional. Registry checkouts are not configured here: the
//! file only names the environment variables that point at them, since their
//! location differs between machines.

use crate::arch::Architecture;
use crate::builder::BuildConfig;
use crate::error::{DeployError, Result};
use crate::git::GitIdentity;
use crate::version::VersionTuple;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use std::fs;

/// Default configuration file name, resolved against the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "deploy.toml";

/// Release settings for one plugin repository.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Product name: base name of the DLL, archives and registry entries.
    pub product: String,
    /// Resource descriptor holding the version; `src/<product>.rc` when
    /// omitted.
    pub resource_file: Option<Utf8PathBuf>,
    /// Changelog used for release notes.
    pub changelog_file: Utf8PathBuf,
    /// Directory passed to `cmake -S`.
    pub source_dir: Utf8PathBuf,
    /// Build directories are `<prefix>-<arch>`.
    pub build_dir_prefix: String,
    /// CMake configuration to build.
    pub build_config: String,
    /// Archives go to `<output_dir>/<version>/`.
    pub output_dir: Utf8PathBuf,
    /// Download URL with `{version}`, `{product}` and `{arch}` placeholders.
    pub download_url_template: String,
    /// Name recorded on commits and tags; git's own setting when omitted.
    pub author_name: Option<String>,
    /// E-mail recorded on commits and tags; git's own setting when omitted.
    pub author_email: Option<String>,
    /// Environment variable naming the plugin manager checkout.
    pub plugin_manager_env: String,
    /// Environment variable naming the plugin list checkout.
    pub plugin_list_env: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            product: "DSpellCheck".to_owned(),
            resource_file: None,
            changelog_file: Utf8PathBuf::from("changelog.txt"),
            source_dir: Utf8PathBuf::from("."),
            build_dir_prefix: "build-msvc2017".to_owned(),
            build_config: "RelWithDebInfo".to_owned(),
            output_dir: Utf8PathBuf::from("out"),
            download_url_template:
                "https://github.com/Predelnik/DSpellCheck/releases/download/v{version}/{product}_{arch}.zip"
                    .to_owned(),
            author_name: None,
            author_email: None,
            plugin_manager_env: "PLUGIN_MANAGER_REPO".to_owned(),
            plugin_list_env: "NPP_PLUGIN_LIST_REPO".to_owned(),
        }
    }
}

impl DeployConfig {
    /// Load the configuration at `path`, or the defaults if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Config`] if the file exists but is not valid
    /// configuration, and [`DeployError::Io`] if it cannot be read.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.exists() {
            debug!("{path} not found, using default configuration");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Parse configuration text read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Config`] on syntax errors and unknown keys.
    pub fn parse(path: &Utf8Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DeployError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// The resource descriptor path.
    #[must_use]
    pub fn resource_path(&self) -> Utf8PathBuf {
        self.resource_file
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(format!("src/{}.rc", self.product)))
    }

    /// A copy with every relative path resolved against `root`.
    ///
    /// Absolute paths are kept, and `.` components are dropped so the
    /// default source directory becomes `root` itself.
    #[must_use]
    pub fn rooted_at(&self, root: &Utf8Path) -> Self {
        Self {
            resource_file: Some(resolve(root, &self.resource_path())),
            changelog_file: resolve(root, &self.changelog_file),
            source_dir: resolve(root, &self.source_dir),
            build_dir_prefix: resolve(root, Utf8Path::new(&self.build_dir_prefix)).into_string(),
            output_dir: resolve(root, &self.output_dir),
            ..self.clone()
        }
    }

    /// The directory receiving this version's archives.
    #[must_use]
    pub fn release_dir(&self, version: VersionTuple) -> Utf8PathBuf {
        self.output_dir.join(version.to_string())
    }

    /// The public download URL of `arch`'s archive for `version`.
    #[must_use]
    pub fn download_url(&self, version: VersionTuple, arch: Architecture) -> String {
        self.download_url_template
            .replace("{version}", &version.to_string())
            .replace("{product}", &self.product)
            .replace("{arch}", arch.tag())
    }

    /// Commit identity, when both name and e-mail are configured.
    #[must_use]
    pub fn identity(&self) -> Option<GitIdentity> {
        Some(GitIdentity {
            name: self.author_name.clone()?,
            email: self.author_email.clone()?,
        })
    }

    /// Build settings derived from this configuration.
    #[must_use]
    pub fn build_settings(&self, verbose: bool) -> BuildConfig {
        BuildConfig {
            product: self.product.clone(),
            source_dir: self.source_dir.clone(),
            build_dir_prefix: self.build_dir_prefix.clone(),
            build_config: self.build_config.clone(),
            verbose,
        }
    }

    /// The plugin manager checkout, if its environment variable is set.
    #[must_use]
    pub fn plugin_manager_repo(&self) -> Option<Utf8PathBuf> {
        checkout_from_env(&self.plugin_manager_env)
    }

    /// The plugin list checkout, if its environment variable is set.
    #[must_use]
    pub fn plugin_list_repo(&self) -> Option<Utf8PathBuf> {
        checkout_from_env(&self.plugin_list_env)
    }
}

fn resolve(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    let mut resolved = root.to_owned();
    for component in path.components() {
        if component != Utf8Component::CurDir {
            resolved.push(component);
        }
    }
    resolved
}

/// Read a checkout path from `var`, treating blank values as unset.
fn checkout_from_env(var: &str) -> Option<Utf8PathBuf> {
    let value = std::env::var(var).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Utf8PathBuf::from(trimmed))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
