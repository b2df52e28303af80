//! Reading the version resource of a built PE image.
//!
//! The linker embeds a `VS_FIXEDFILEINFO` structure in the `.rsrc` section.
//! Its signature is unique enough that a byte scan finds it without walking
//! the resource directory.

use super::tuple::VersionTuple;
use crate::error::Result;
use camino::Utf8Path;
use log::debug;
use std::fs;

/// `VS_FIXEDFILEINFO::dwSignature`, little-endian.
const FIXED_FILE_INFO_SIGNATURE: [u8; 4] = 0xFEEF_04BD_u32.to_le_bytes();

/// Offset of `dwFileVersionMS` from the signature. Each DWORD holds two
/// little-endian words, low word first.
const FILE_VERSION_MS_OFFSET: usize = 8;

/// Offset of `dwFileVersionLS` from the signature.
const FILE_VERSION_LS_OFFSET: usize = 12;

/// Read the file version recorded in the binary at `path`.
///
/// Returns `Ok(None)` when the image carries no version resource.
///
/// # Errors
///
/// Returns [`crate::error::DeployError::Io`] if the file cannot be read.
pub fn binary_version(path: &Utf8Path) -> Result<Option<VersionTuple>> {
    let bytes = fs::read(path)?;
    let version = fixed_file_version(&bytes);
    debug!(
        "{path}: embedded file version {}",
        version.map_or_else(|| "missing".to_owned(), |v| v.to_string())
    );
    Ok(version)
}

/// Find the first `VS_FIXEDFILEINFO` block in `bytes` and decode its file
/// version.
#[must_use]
pub fn fixed_file_version(bytes: &[u8]) -> Option<VersionTuple> {
    let start = bytes
        .windows(FIXED_FILE_INFO_SIGNATURE.len())
        .position(|window| window == FIXED_FILE_INFO_SIGNATURE)?;

    let word = |offset: usize| read_u16_le(bytes, start + offset);
    Some(VersionTuple::new(
        word(FILE_VERSION_MS_OFFSET + 2)?,
        word(FILE_VERSION_MS_OFFSET)?,
        word(FILE_VERSION_LS_OFFSET + 2)?,
        word(FILE_VERSION_LS_OFFSET)?,
    ))
}

fn read_u16_le(bytes: &[u8], offset: usize) -> Option<u16> {
    let chunk = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes(chunk.try_into().ok()?))
}
