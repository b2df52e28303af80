//! CLI argument definitions for the plugin deployer.
//!
//! The flags mirror the release steps: bumping the version, tagging, and
//! publishing to the plugin registries. Building and packaging always run
//! unless `--update-only-rc` stops the run after the version bump.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::version::BumpKind;
use camino::Utf8PathBuf;
use clap::Parser;

/// Build, package and publish a release of the plugin.
#[derive(Parser, Debug, Clone)]
#[command(name = "plugin-deployer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build, package and publish a release of the plugin.\n\n",
    "Each run builds the x64 and x86 DLLs with CMake and zips them into ",
    "out/<version>/<Product>_<arch>.zip, copying the debug symbols alongside. ",
    "With --new-minor or --new-major the version in the resource file is bumped, ",
    "committed and tagged first, and the plugin registries are updated afterwards.\n\n",
    "Registry checkouts are located through the PLUGIN_MANAGER_REPO and ",
    "NPP_PLUGIN_LIST_REPO environment variables; an unset variable skips that registry.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Rebuild and repackage the current version:\n",
    "    $ plugin-deployer\n\n",
    "  Release a new build and publish it:\n",
    "    $ plugin-deployer --new-minor\n\n",
    "  Bump the version without building:\n",
    "    $ plugin-deployer --new-major --update-only-rc\n\n",
    "  Publish the current version to the registries:\n",
    "    $ plugin-deployer --update-pm",
))]
pub struct Cli {
    /// Increment the build component of the version before building.
    #[arg(long)]
    pub new_minor: bool,

    /// Increment the minor component and reset the rest (wins over --new-minor).
    #[arg(long)]
    pub new_major: bool,

    /// Update the plugin registries even without a version bump.
    #[arg(long)]
    pub update_pm: bool,

    /// Stop after rewriting the version in the resource file.
    #[arg(long)]
    pub update_only_rc: bool,

    /// Tag HEAD with the current version when no bump is requested.
    #[arg(long)]
    pub add_tag: bool,

    /// Stream build output and show debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: Utf8PathBuf,

    /// Disable coloured output.
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// The requested version bump, if any. A major bump wins over a minor one.
    #[must_use]
    pub const fn bump(&self) -> Option<BumpKind> {
        if self.new_major {
            Some(BumpKind::Major)
        } else if self.new_minor {
            Some(BumpKind::Minor)
        } else {
            None
        }
    }

    /// Whether this run should publish to the plugin registries.
    #[must_use]
    pub const fn updates_registries(&self) -> bool {
        self.bump().is_some() || self.update_pm
    }
}

impl Default for Cli {
    /// A plain rebuild with every flag disabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use plugin_deployer::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert!(cli.bump().is_none());
    /// assert_eq!(cli.config.as_str(), "deploy.toml");
    /// ```
    fn default() -> Self {
        Self {
            new_minor: false,
            new_major: false,
            update_pm: false,
            update_only_rc: false,
            add_tag: false,
            verbose: false,
            config: Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
            no_color: false,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
