//! CMake build orchestration for the plugin binaries.
//!
//! Each architecture gets its own build tree, configured once with the
//! matching generator platform and then built in the release configuration.
//! Architectures are built strictly in order and the first failure ends the
//! run.

use crate::arch::Architecture;
use crate::error::{BuildStep, DeployError, Result};
use crate::process::{CommandExecutor, CommandRequest, failure_reason};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Configuration for the build process.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Product name, which is also the base name of the built DLL.
    pub product: String,
    /// Directory holding the top-level `CMakeLists.txt`.
    pub source_dir: Utf8PathBuf,
    /// Prefix of the per-architecture build directories.
    pub build_dir_prefix: String,
    /// CMake configuration to build (`RelWithDebInfo`).
    pub build_config: String,
    /// Stream compiler output instead of capturing it.
    pub verbose: bool,
}

/// Paths produced by building one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Architecture that was built.
    pub arch: Architecture,
    /// The plugin DLL.
    pub binary_path: Utf8PathBuf,
    /// The matching program database.
    pub debug_symbols_path: Utf8PathBuf,
}

/// Builder for the per-architecture plugin binaries.
pub struct Builder<'a> {
    config: BuildConfig,
    executor: &'a dyn CommandExecutor,
}

impl<'a> Builder<'a> {
    /// Create a new builder that runs commands through `executor`.
    #[must_use]
    pub fn new(config: BuildConfig, executor: &'a dyn CommandExecutor) -> Self {
        Self { config, executor }
    }

    /// Build directory for `arch`, e.g. `build-msvc2017-x64`.
    #[must_use]
    pub fn build_dir(&self, arch: Architecture) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}-{}", self.config.build_dir_prefix, arch.tag()))
    }

    /// Configure and build a single architecture.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::BuildFailed`] if either CMake invocation cannot
    /// be spawned or exits unsuccessfully.
    pub fn build_arch(&self, arch: Architecture) -> Result<BuildArtifact> {
        let build_dir = self.build_dir(arch);

        info!("configuring {arch} in {build_dir}");
        self.run_step(arch, BuildStep::Configure, &self.configure_request(arch, &build_dir))?;

        info!("building {arch} ({})", self.config.build_config);
        self.run_step(arch, BuildStep::Build, &self.build_request(&build_dir))?;

        Ok(self.artifact(arch, &build_dir))
    }

    /// Build every architecture in release order, calling `on_start` before
    /// each one.
    ///
    /// # Errors
    ///
    /// Returns the first build failure; later architectures are not attempted.
    pub fn build_all(
        &self,
        mut on_start: impl FnMut(Architecture),
    ) -> Result<Vec<BuildArtifact>> {
        let mut artifacts = Vec::with_capacity(Architecture::ALL.len());

        for arch in Architecture::ALL {
            on_start(arch);
            let artifact = self.build_arch(arch)?;
            artifacts.push(artifact);
        }

        Ok(artifacts)
    }

    fn configure_request(&self, arch: Architecture, build_dir: &Utf8Path) -> CommandRequest {
        CommandRequest::new("cmake")
            .args([
                "-S",
                self.config.source_dir.as_str(),
                "-B",
                build_dir.as_str(),
                "-A",
                arch.generator_platform(),
            ])
            .streamed(self.config.verbose)
    }

    fn build_request(&self, build_dir: &Utf8Path) -> CommandRequest {
        CommandRequest::new("cmake")
            .args([
                "--build",
                build_dir.as_str(),
                "--config",
                self.config.build_config.as_str(),
            ])
            .streamed(self.config.verbose)
    }

    fn run_step(&self, arch: Architecture, step: BuildStep, request: &CommandRequest) -> Result<()> {
        let output = self
            .executor
            .run(request)
            .map_err(|e| DeployError::BuildFailed {
                arch,
                step,
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(DeployError::BuildFailed {
                arch,
                step,
                reason: failure_reason(&output),
            });
        }
        Ok(())
    }

    fn artifact(&self, arch: Architecture, build_dir: &Utf8Path) -> BuildArtifact {
        let output_dir = build_dir.join(&self.config.build_config);
        BuildArtifact {
            arch,
            binary_path: output_dir.join(format!("{}.dll", self.config.product)),
            debug_symbols_path: output_dir.join(format!("{}.pdb", self.config.product)),
        }
    }
}
