//! Reading and rewriting the version stamp in a resource descriptor.
//!
//! The descriptor carries the version four times: `FILEVERSION` and
//! `PRODUCTVERSION` in comma form, and the `FileVersion` and `ProductVersion`
//! string values in dotted form. Only the digits inside those fields are
//! touched; every other byte of the file is preserved.

use super::encoding::{self, DecodedText};
use super::tuple::VersionTuple;
use crate::error::{DeployError, Result};
use crate::pattern::compile_regex;
use camino::Utf8Path;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs;
use std::io::Write;

static COMMA_FORM: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r"^\s*(?:FILEVERSION|PRODUCTVERSION)\s+(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)",
        "comma version pattern should compile",
    )
});

static DOTTED_FORM: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r#"^\s*VALUE\s+"(?:FileVersion|ProductVersion)"\s*,\s*"(\d+)\.(\d+)\.(\d+)\.(\d+)"#,
        "dotted version pattern should compile",
    )
});

static FILE_VERSION_VALUE: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r#"^\s*VALUE\s+"FileVersion"\s*,\s*"(\d+)\.(\d+)\.(\d+)\.(\d+)"#,
        "file version pattern should compile",
    )
});

/// Read the product version from the descriptor at `path`.
///
/// The dotted `FileVersion` value is authoritative.
///
/// # Errors
///
/// Returns [`DeployError::VersionParse`] if the file cannot be decoded or
/// has no `FileVersion` value, and [`DeployError::Io`] if it cannot be read.
pub fn read_version(path: &Utf8Path) -> Result<VersionTuple> {
    let decoded = load(path)?;
    parse_version(&decoded.text).ok_or_else(|| DeployError::VersionParse {
        path: path.to_owned(),
        reason: "no VALUE \"FileVersion\" line with four 16-bit components".to_owned(),
    })
}

/// Rewrite every version field in the descriptor at `path` to `version`.
///
/// The file keeps its encoding and line endings. It is replaced through a
/// temporary file in the same directory: the temporary file is written, the
/// original deleted, and the temporary file renamed into place.
///
/// # Errors
///
/// Returns [`DeployError::VersionParse`] if the file cannot be decoded or
/// contains no version fields, and [`DeployError::Io`] on I/O failures.
pub fn write_version(path: &Utf8Path, version: VersionTuple) -> Result<()> {
    let decoded = load(path)?;
    let (text, rewritten) = rewrite_version_text(&decoded.text, version);
    if rewritten == 0 {
        return Err(DeployError::VersionParse {
            path: path.to_owned(),
            reason: "no version fields to rewrite".to_owned(),
        });
    }
    debug!("rewrote {rewritten} version field(s) in {path} to {version}");

    let bytes = encoding::encode(&text, decoded.encoding);
    replace_file(path, &bytes)
}

/// Find the dotted `FileVersion` value in descriptor text.
#[must_use]
pub fn parse_version(text: &str) -> Option<VersionTuple> {
    text.lines().find_map(|line| {
        let caps = FILE_VERSION_VALUE.captures(line)?;
        let mut components = [0_u16; 4];
        for (slot, index) in components.iter_mut().zip(1..=4) {
            *slot = caps.get(index)?.as_str().parse().ok()?;
        }
        Some(VersionTuple::from_components(components))
    })
}

/// Rewrite all version fields in `text`, returning the new text and the
/// number of lines that matched a version pattern.
///
/// Line terminators are left exactly as they were, and a digit run that
/// already holds the target number is not touched.
#[must_use]
pub fn rewrite_version_text(text: &str, version: VersionTuple) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut matched = 0;

    for piece in text.split_inclusive('\n') {
        let body_len = piece
            .strip_suffix("\r\n")
            .or_else(|| piece.strip_suffix('\n'))
            .map_or(piece.len(), str::len);
        let (body, terminator) = piece.split_at(body_len);

        let caps = COMMA_FORM
            .captures(body)
            .or_else(|| DOTTED_FORM.captures(body));
        match caps {
            Some(caps) => {
                matched += 1;
                out.push_str(&substitute_components(body, &caps, version));
            }
            None => out.push_str(body),
        }
        out.push_str(terminator);
    }

    (out, matched)
}

/// Replace capture groups 1..=4 of `line` with the version components.
fn substitute_components(line: &str, caps: &Captures<'_>, version: VersionTuple) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (index, component) in (1..=4).zip(version.components()) {
        let Some(group) = caps.get(index) else {
            continue;
        };
        out.push_str(&line[last..group.start()]);
        if group.as_str().parse::<u16>().ok() == Some(component) {
            out.push_str(group.as_str());
        } else {
            out.push_str(&component.to_string());
        }
        last = group.end();
    }
    out.push_str(&line[last..]);
    out
}

fn load(path: &Utf8Path) -> Result<DecodedText> {
    let bytes = fs::read(path)?;
    encoding::decode(&bytes).map_err(|e| DeployError::VersionParse {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

fn replace_file(path: &Utf8Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;

    fs::remove_file(path)?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
