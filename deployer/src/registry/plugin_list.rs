//! The plugin list checkout: one `src/pl.<arch>.json` per architecture.

use super::{FieldUpdates, RegistryFormat, update_named_document};
use crate::arch::Architecture;
use crate::digest::Sha256Digest;
use crate::error::Result;
use crate::version::VersionTuple;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use log::{debug, info};
use std::fs;

/// What the plugin list needs to know about one architecture's release.
#[derive(Debug, Clone)]
pub struct PluginListRelease<'a> {
    /// Architecture whose document is patched.
    pub arch: Architecture,
    /// Released version.
    pub version: VersionTuple,
    /// SHA-256 of the architecture's archive.
    pub archive_sha256: &'a Sha256Digest,
    /// Download URL of the archive.
    pub download_url: &'a str,
}

/// Path of the document for `arch` inside the checkout at `repo`.
#[must_use]
pub fn document_path(repo: &Utf8Path, arch: Architecture) -> Utf8PathBuf {
    repo.join("src").join(format!("pl.{}.json", arch.tag()))
}

/// Patch `product`'s entry in the document for `release.arch`.
///
/// Returns whether the document changed.
///
/// # Errors
///
/// Returns registry lookup errors for a missing entry or field and I/O
/// errors when the document cannot be read or written.
pub fn update_plugin_list(
    repo: &Utf8Path,
    product: &str,
    release: &PluginListRelease<'_>,
) -> Result<bool> {
    let path = document_path(repo, release.arch);
    let document_name = path.file_name().unwrap_or(path.as_str()).to_owned();
    let original = fs::read_to_string(&path)?;
    let updates = FieldUpdates::new()
        .with("version", release.version.to_string())
        .with("id", release.archive_sha256.as_str())
        .with("repository", release.download_url);

    let mut patched = update_named_document(
        &document_name,
        &original,
        RegistryFormat::Json,
        product,
        &updates,
    )?;
    if !patched.ends_with('\n') {
        patched.push('\n');
    }

    if patched == original {
        debug!("{path} already describes {}", release.version);
        return Ok(false);
    }
    fs::write(&path, patched)?;
    info!("updated {product} in {path}");
    Ok(true)
}

/// Commit message recording a release in the plugin list.
#[must_use]
pub fn commit_message(product: &str, version: VersionTuple, date: NaiveDate) -> String {
    format!("Update {product} to {version} ({})", date.format("%Y-%m-%d"))
}
