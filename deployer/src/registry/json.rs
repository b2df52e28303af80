//! Field patching for the JSON plugin list.
//!
//! The document is an object whose `npp-plugins` array holds one object per
//! plugin. The document is parsed with `serde_json` to validate it, then a
//! span scanner locates the exact bytes of each member value so that
//! indentation, key order and escaping elsewhere survive untouched.

use super::{FieldUpdates, Replacement};
use crate::error::{DeployError, Result};
use serde_json::Value;
use std::ops::Range;

/// Array member holding the plugin descriptors.
pub const PLUGIN_ARRAY_KEY: &str = "npp-plugins";

/// Member identifying a plugin descriptor.
pub const DISPLAY_NAME_KEY: &str = "display-name";

/// Compute the replacements that set each field of `entry_key`.
pub(crate) fn plan_updates(
    document: &str,
    entry_key: &str,
    updates: &FieldUpdates,
) -> Result<Vec<Replacement>> {
    serde_json::from_str::<Value>(document).map_err(invalid)?;

    let bytes = document.as_bytes();
    let members = entry_members(document, entry_key)?;
    let mut replacements = Vec::new();

    for (field, value) in updates.iter() {
        let span = members
            .iter()
            .find(|member| member.key == field)
            .map(|member| member.value.clone())
            .filter(|span| bytes.get(span.start) == Some(&b'"'))
            .ok_or_else(|| DeployError::FieldNotFound {
                name: entry_key.to_owned(),
                field: field.to_owned(),
            })?;

        let current: String = serde_json::from_str(&document[span.clone()])?;
        if current == value {
            continue;
        }
        replacements.push(Replacement {
            start: span.start,
            end: span.end,
            text: serde_json::to_string(value)?,
        });
    }
    Ok(replacements)
}

/// Re-parse a patched document and confirm every field holds its new value.
pub(crate) fn verify(document: &str, entry_key: &str, updates: &FieldUpdates) -> Result<()> {
    let root: Value = serde_json::from_str(document).map_err(invalid)?;
    let entry = plugin_array(&root)
        .and_then(|plugins| {
            plugins
                .iter()
                .find(|p| p.get(DISPLAY_NAME_KEY).and_then(Value::as_str) == Some(entry_key))
        })
        .ok_or_else(|| DeployError::InvalidDocument {
            document: super::RegistryFormat::Json.to_string(),
            reason: format!("entry {entry_key} disappeared while patching"),
        })?;

    for (field, value) in updates.iter() {
        if entry.get(field).and_then(Value::as_str) != Some(value) {
            return Err(DeployError::InvalidDocument {
                document: super::RegistryFormat::Json.to_string(),
                reason: format!("field {field} of {entry_key} did not take the new value"),
            });
        }
    }
    Ok(())
}

fn plugin_array(root: &Value) -> Option<&Vec<Value>> {
    match root {
        Value::Array(plugins) => Some(plugins),
        Value::Object(map) => map.get(PLUGIN_ARRAY_KEY).and_then(Value::as_array),
        _ => None,
    }
}

fn invalid(err: serde_json::Error) -> DeployError {
    DeployError::InvalidDocument {
        document: super::RegistryFormat::Json.to_string(),
        reason: err.to_string(),
    }
}

/// A member of a JSON object: its decoded key and the span of its value.
#[derive(Debug)]
struct Member {
    key: String,
    value: Range<usize>,
}

/// The members of the plugin object whose display name is `entry_key`.
fn entry_members(document: &str, entry_key: &str) -> Result<Vec<Member>> {
    let bytes = document.as_bytes();
    let malformed = || DeployError::InvalidDocument {
        document: super::RegistryFormat::Json.to_string(),
        reason: "unexpected structure".to_owned(),
    };

    let root = skip_ws(bytes, 0);
    let array = match bytes.get(root) {
        Some(b'[') => root,
        Some(b'{') => object_members(document, root)
            .ok_or_else(malformed)?
            .into_iter()
            .find(|member| member.key == PLUGIN_ARRAY_KEY)
            .map(|member| member.value.start)
            .filter(|&start| bytes.get(start) == Some(&b'['))
            .ok_or_else(|| DeployError::InvalidDocument {
                document: super::RegistryFormat::Json.to_string(),
                reason: format!("no {PLUGIN_ARRAY_KEY} array"),
            })?,
        _ => return Err(malformed()),
    };

    for element in array_elements(bytes, array).ok_or_else(malformed)? {
        if bytes.get(element.start) != Some(&b'{') {
            continue;
        }
        let members = object_members(document, element.start).ok_or_else(malformed)?;
        let is_entry = members.iter().any(|member| {
            member.key == DISPLAY_NAME_KEY
                && serde_json::from_str::<String>(&document[member.value.clone()])
                    .is_ok_and(|name| name == entry_key)
        });
        if is_entry {
            return Ok(members);
        }
    }

    Err(DeployError::EntryNotFound {
        document: super::RegistryFormat::Json.to_string(),
        name: entry_key.to_owned(),
    })
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// End (exclusive) of the string literal starting at `start`.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    loop {
        match *bytes.get(i)? {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
}

/// End (exclusive) of the value starting at `start`.
fn value_end(bytes: &[u8], start: usize) -> Option<usize> {
    match *bytes.get(start)? {
        b'"' => string_end(bytes, start),
        b'{' | b'[' => {
            let mut depth = 0_usize;
            let mut i = start;
            loop {
                match *bytes.get(i)? {
                    b'"' => {
                        i = string_end(bytes, i)?;
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(i + 1);
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
        }
        _ => {
            let mut i = start;
            while bytes
                .get(i)
                .is_some_and(|&b| !matches!(b, b',' | b'}' | b']') && !b.is_ascii_whitespace())
            {
                i += 1;
            }
            Some(i)
        }
    }
}

fn array_elements(bytes: &[u8], open: usize) -> Option<Vec<Range<usize>>> {
    let mut elements = Vec::new();
    let mut i = skip_ws(bytes, open + 1);
    if bytes.get(i) == Some(&b']') {
        return Some(elements);
    }
    loop {
        let end = value_end(bytes, i)?;
        elements.push(i..end);
        i = skip_ws(bytes, end);
        match *bytes.get(i)? {
            b',' => i = skip_ws(bytes, i + 1),
            b']' => return Some(elements),
            _ => return None,
        }
    }
}

fn object_members(document: &str, open: usize) -> Option<Vec<Member>> {
    let bytes = document.as_bytes();
    let mut members = Vec::new();
    let mut i = skip_ws(bytes, open + 1);
    if bytes.get(i) == Some(&b'}') {
        return Some(members);
    }
    loop {
        let key_end = string_end(bytes, i)?;
        let key: String = serde_json::from_str(document.get(i..key_end)?).ok()?;
        i = skip_ws(bytes, key_end);
        if bytes.get(i) != Some(&b':') {
            return None;
        }
        let value_start = skip_ws(bytes, i + 1);
        let end = value_end(bytes, value_start)?;
        members.push(Member {
            key,
            value: value_start..end,
        });
        i = skip_ws(bytes, end);
        match *bytes.get(i)? {
            b',' => i = skip_ws(bytes, i + 1),
            b'}' => return Some(members),
            _ => return None,
        }
    }
}
