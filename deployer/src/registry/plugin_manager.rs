//! The plugin manager checkout: `PluginManagerPlugins.xml` and
//! `validate.json`.
//!
//! Only the 64-bit build is published through this list. The checkout is
//! edited in place and left for the maintainer to review and commit.

use super::{FieldUpdates, RegistryFormat, update_named_document};
use crate::digest::compute_md5;
use crate::error::Result;
use crate::version::VersionTuple;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde_json::{Map, Value};
use std::fs;
use std::io;

/// Registry document name inside the checkout.
pub const DOCUMENT_NAME: &str = "PluginManagerPlugins.xml";

/// Download validation document name inside the checkout.
pub const VALIDATION_NAME: &str = "validate.json";

/// What the plugin manager needs to know about a release.
#[derive(Debug, Clone)]
pub struct PluginManagerRelease<'a> {
    /// Display name of the registry entry.
    pub product: &'a str,
    /// Released version.
    pub version: VersionTuple,
    /// Download URL of the x64 archive.
    pub download_url: &'a str,
    /// Changelog excerpt with escaped line breaks.
    pub changelog_excerpt: &'a str,
    /// The x64 DLL built in this run.
    pub x64_binary: &'a Utf8Path,
}

/// Files rewritten in the checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManagerUpdate {
    /// Path of the patched registry document.
    pub document: Utf8PathBuf,
    /// Path of the regenerated validation document.
    pub validation: Utf8PathBuf,
}

/// Patch the product entry and regenerate the validation document in the
/// checkout at `repo`.
///
/// # Errors
///
/// Returns registry lookup errors for a missing entry or field and I/O
/// errors when a file cannot be read or written.
pub fn update_plugin_manager(
    repo: &Utf8Path,
    release: &PluginManagerRelease<'_>,
) -> Result<PluginManagerUpdate> {
    let document = repo.join(DOCUMENT_NAME);
    let original = fs::read_to_string(&document)?;
    let updates = FieldUpdates::new()
        .with("x64Version", release.version.to_string())
        .with("download", release.download_url)
        .with("latestUpdate", release.changelog_excerpt);

    let patched = update_named_document(
        DOCUMENT_NAME,
        &original,
        RegistryFormat::Xml,
        release.product,
        &updates,
    )?;
    if patched == original {
        debug!("{document} already describes {}", release.version);
    } else {
        fs::write(&document, patched)?;
        info!("updated {} in {document}", release.product);
    }

    let validation = repo.join(VALIDATION_NAME);
    fs::write(&validation, validation_document(release.x64_binary)?)?;
    debug!("wrote {validation}");

    Ok(PluginManagerUpdate {
        document,
        validation,
    })
}

/// The validation document for `binary`: its MD5 mapped to its file name.
///
/// # Errors
///
/// Returns an I/O error if the binary cannot be read or has no file name.
pub fn validation_document(binary: &Utf8Path) -> Result<String> {
    let file_name = binary.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("binary path has no file name: {binary}"),
        )
    })?;
    let digest = compute_md5(binary)?;

    let mut map = Map::new();
    map.insert(digest.to_string(), Value::String(file_name.to_owned()));
    let mut text = serde_json::to_string_pretty(&Value::Object(map))?;
    text.push('\n');
    Ok(text)
}
