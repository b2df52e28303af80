//! Release pipeline orchestration.
//!
//! A run moves through fixed stages: optional version bump with its commit
//! and tag, building every architecture, packaging every architecture, and
//! optionally publishing to the plugin registries. Any error ends the run;
//! steps that already completed are not rolled back.

use crate::arch::Architecture;
use crate::builder::{BuildArtifact, Builder};
use crate::changelog::extract_excerpt;
use crate::cli::Cli;
use crate::config::DeployConfig;
use crate::digest::compute_sha256;
use crate::error::{DeployError, Result};
use crate::git::{CommitId, Git};
use crate::output::{OutputStyle, SUCCESS_BANNER, write_stderr_line};
use crate::packaging::{PackagedArtifact, archive_stem, package};
use crate::process::CommandExecutor;
use crate::registry::plugin_list::{self, PluginListRelease, update_plugin_list};
use crate::registry::plugin_manager::{PluginManagerRelease, update_plugin_manager};
use crate::version::{VersionTuple, binary_version, read_version, write_version};
use camino::Utf8Path;
use chrono::NaiveDate;
use log::{debug, info};
use std::fmt;
use std::fs;
use std::io::{self, Write};

/// Everything a run needs from its surroundings.
pub struct RunContext<'a> {
    /// Parsed command line.
    pub cli: &'a Cli,
    /// Loaded configuration.
    pub config: &'a DeployConfig,
    /// Runs CMake and git.
    pub executor: &'a dyn CommandExecutor,
    /// Highlighting for the banner and warnings.
    pub style: &'a dyn OutputStyle,
    /// Working copy of the plugin repository. Relative configuration paths
    /// and git commands are resolved against it.
    pub workspace_root: &'a Utf8Path,
    /// Date recorded in registry commit messages.
    pub run_date: NaiveDate,
}

/// A plugin registry the deployer publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    /// `PluginManagerPlugins.xml`, edited but not committed.
    PluginManager,
    /// `src/pl.<arch>.json`, edited and committed.
    PluginList,
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PluginManager => f.write_str("plugin manager"),
            Self::PluginList => f.write_str("plugin list"),
        }
    }
}

/// What happened to one registry during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryStatus {
    /// The checkout was edited and left for review.
    Updated,
    /// The checkout was edited and committed.
    Committed(CommitId),
    /// The checkout already described this release.
    Unchanged,
    /// The environment variable naming the checkout was not set.
    Skipped {
        /// The unset variable.
        variable: String,
    },
}

/// The outcome of a run, built up stage by stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The version the run released.
    pub version: VersionTuple,
    /// The version commit, when the run bumped the version.
    pub commit: Option<CommitId>,
    /// The tag created by the run.
    pub tag: Option<String>,
    /// Archives created by the run.
    pub artifacts: Vec<PackagedArtifact>,
    /// Registry outcomes, when registries were published to.
    pub registries: Vec<(Registry, RegistryStatus)>,
    /// Whether the run stopped after rewriting the resource file.
    pub stopped_after_version: bool,
}

impl RunReport {
    fn new(version: VersionTuple) -> Self {
        Self {
            version,
            commit: None,
            tag: None,
            artifacts: Vec::new(),
            registries: Vec::new(),
            stopped_after_version: false,
        }
    }
}

/// Run the release pipeline.
///
/// Status lines and the final banner are written to `stderr`.
///
/// # Errors
///
/// Returns the first error of any stage.
pub fn run(context: &RunContext<'_>, stderr: &mut dyn Write) -> Result<RunReport> {
    let config = context.config.rooted_at(context.workspace_root);
    let context = &RunContext {
        config: &config,
        ..*context
    };
    let resource = context.config.resource_path();
    let current = read_version(&resource)?;
    debug!("{resource} holds version {current}");
    let mut report = RunReport::new(current);

    record_version(context, &resource, &mut report, stderr)?;
    if context.cli.update_only_rc {
        report.stopped_after_version = true;
        write_stderr_line(stderr, context.style.success(SUCCESS_BANNER));
        return Ok(report);
    }

    let built = build_all(context, stderr)?;
    check_binary_versions(context, &built, report.version, stderr)?;
    report.artifacts = package_all(context, &built, report.version, stderr)?;

    if context.cli.updates_registries() {
        report.registries = publish(context, &report)?;
        for (registry, status) in &report.registries {
            if let RegistryStatus::Skipped { variable } = status {
                write_stderr_line(
                    stderr,
                    format!("{variable} is not set, skipping {registry} update"),
                );
            }
        }
    }

    write_stderr_line(stderr, context.style.success(SUCCESS_BANNER));
    Ok(report)
}

/// Bump, commit and tag, or just tag, according to the flags.
fn record_version(
    context: &RunContext<'_>,
    resource: &Utf8Path,
    report: &mut RunReport,
    stderr: &mut dyn Write,
) -> Result<()> {
    let identity = context.config.identity();
    let git = Git::new(context.workspace_root, identity.as_ref(), context.executor);

    if let Some(kind) = context.cli.bump() {
        let next = report
            .version
            .bump(kind)
            .ok_or(DeployError::VersionOverflow {
                version: report.version,
            })?;
        write_version(resource, next)?;
        write_stderr_line(stderr, format!("Version bumped to {next}"));

        let commit = git.commit_all(&format!("Version {next}"))?;
        report.tag = Some(git.tag(next, &commit)?);
        report.commit = Some(commit);
        report.version = next;
    } else if context.cli.add_tag {
        let head = git.head()?;
        report.tag = Some(git.tag(report.version, &head)?);
    }

    if let Some(tag) = &report.tag {
        info!("created tag {tag}");
    }
    Ok(())
}

fn build_all(context: &RunContext<'_>, stderr: &mut dyn Write) -> Result<Vec<BuildArtifact>> {
    let builder = Builder::new(
        context.config.build_settings(context.cli.verbose),
        context.executor,
    );
    builder.build_all(|arch| write_stderr_line(stderr, format!("Building {arch} version...")))
}

/// Warn when a built DLL carries a different version than the descriptor.
fn check_binary_versions(
    context: &RunContext<'_>,
    built: &[BuildArtifact],
    expected: VersionTuple,
    stderr: &mut dyn Write,
) -> Result<()> {
    for artifact in built {
        match binary_version(&artifact.binary_path)? {
            Some(found) if found != expected => write_stderr_line(
                stderr,
                context.style.warning(&format!(
                    "warning: {} reports version {found}, expected {expected}",
                    artifact.binary_path
                )),
            ),
            Some(_) => {}
            None => debug!("{} has no version resource", artifact.binary_path),
        }
    }
    Ok(())
}

fn package_all(
    context: &RunContext<'_>,
    built: &[BuildArtifact],
    version: VersionTuple,
    stderr: &mut dyn Write,
) -> Result<Vec<PackagedArtifact>> {
    let release_dir = context.config.release_dir(version);
    let mut packaged = Vec::with_capacity(built.len());
    for artifact in built {
        let stem = archive_stem(&context.config.product, artifact.arch);
        write_stderr_line(
            stderr,
            format!("Deploying to {}...", release_dir.join(format!("{stem}.zip"))),
        );
        packaged.push(package(artifact, &release_dir, &stem)?);
    }
    Ok(packaged)
}

fn publish(context: &RunContext<'_>, report: &RunReport) -> Result<Vec<(Registry, RegistryStatus)>> {
    let config = context.config;
    let plugin_manager = match config.plugin_manager_repo() {
        Some(repo) => publish_plugin_manager(context, report, &repo)?,
        None => RegistryStatus::Skipped {
            variable: config.plugin_manager_env.clone(),
        },
    };
    let plugin_list = match config.plugin_list_repo() {
        Some(repo) => publish_plugin_list(context, report, &repo)?,
        None => RegistryStatus::Skipped {
            variable: config.plugin_list_env.clone(),
        },
    };
    Ok(vec![
        (Registry::PluginManager, plugin_manager),
        (Registry::PluginList, plugin_list),
    ])
}

fn publish_plugin_manager(
    context: &RunContext<'_>,
    report: &RunReport,
    repo: &Utf8Path,
) -> Result<RegistryStatus> {
    let config = context.config;
    let x64 = report
        .artifacts
        .iter()
        .find(|a| a.arch == Architecture::X64)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no x64 archive was packaged"))?;

    let changelog = fs::read_to_string(&config.changelog_file)?;
    let excerpt = extract_excerpt(&changelog, &report.version.to_string())?;
    let download_url = config.download_url(report.version, Architecture::X64);

    update_plugin_manager(
        repo,
        &PluginManagerRelease {
            product: &config.product,
            version: report.version,
            download_url: &download_url,
            changelog_excerpt: &excerpt,
            x64_binary: &x64.binary_path,
        },
    )?;
    Ok(RegistryStatus::Updated)
}

fn publish_plugin_list(
    context: &RunContext<'_>,
    report: &RunReport,
    repo: &Utf8Path,
) -> Result<RegistryStatus> {
    let config = context.config;
    let mut changed = false;
    for artifact in &report.artifacts {
        let digest = compute_sha256(&artifact.archive_path)?;
        let download_url = config.download_url(report.version, artifact.arch);
        changed |= update_plugin_list(
            repo,
            &config.product,
            &PluginListRelease {
                arch: artifact.arch,
                version: report.version,
                archive_sha256: &digest,
                download_url: &download_url,
            },
        )?;
    }
    if !changed {
        return Ok(RegistryStatus::Unchanged);
    }

    let identity = config.identity();
    let message = plugin_list::commit_message(&config.product, report.version, context.run_date);
    let commit = Git::new(repo, identity.as_ref(), context.executor).commit_all(&message)?;
    Ok(RegistryStatus::Committed(commit))
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
