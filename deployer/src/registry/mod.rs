//! Patching entries in plugin registry documents.
//!
//! Registry documents are maintained by hand in other repositories, so they
//! are edited textually: only the characters holding a changed value are
//! replaced and the rest of the document is kept byte-for-byte. Patching
//! twice with the same values leaves the document unchanged.

pub mod json;
pub mod plugin_list;
pub mod plugin_manager;
pub mod xml;

use crate::error::{DeployError, Result};
use std::fmt;

/// The syntax of a registry document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryFormat {
    /// `<plugin name="...">` elements with one child element per field.
    Xml,
    /// Objects in a `npp-plugins` array, keyed by `display-name`.
    Json,
}

impl fmt::Display for RegistryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xml => f.write_str("XML registry"),
            Self::Json => f.write_str("JSON registry"),
        }
    }
}

/// Ordered field name to new value assignments for one entry.
///
/// Values are raw strings; each format escapes them as it writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdates(Vec<(String, String)>);

impl FieldUpdates {
    /// An empty set of updates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment, replacing any earlier one for the same field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.0.push((field, value)),
        }
        self
    }

    /// Iterate over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }
}

/// A byte range of the original document and its replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Replacement {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) text: String,
}

/// Apply the field updates to the entry named `entry_key` in `document`.
///
/// # Errors
///
/// Returns [`DeployError::EntryNotFound`] if no entry has that name,
/// [`DeployError::FieldNotFound`] if the entry lacks one of the fields, and
/// [`DeployError::InvalidDocument`] if the document cannot be parsed.
///
/// # Examples
///
/// ```
/// use plugin_deployer::registry::{FieldUpdates, RegistryFormat, update_entry};
///
/// let document = "<plugins>\n  <plugin name=\"DSpellCheck\">\n    <x64Version>1.4.0.0</x64Version>\n  </plugin>\n</plugins>\n";
/// let updates = FieldUpdates::new().with("x64Version", "1.4.0.1");
/// let patched = update_entry(document, RegistryFormat::Xml, "DSpellCheck", &updates)?;
/// assert_eq!(patched, document.replace("1.4.0.0", "1.4.0.1"));
/// # Ok::<(), plugin_deployer::error::DeployError>(())
/// ```
pub fn update_entry(
    document: &str,
    format: RegistryFormat,
    entry_key: &str,
    updates: &FieldUpdates,
) -> Result<String> {
    let replacements = match format {
        RegistryFormat::Xml => xml::plan_updates(document, entry_key, updates)?,
        RegistryFormat::Json => json::plan_updates(document, entry_key, updates)?,
    };
    let patched = apply(document, replacements);
    if format == RegistryFormat::Json {
        json::verify(&patched, entry_key, updates)?;
    }
    Ok(patched)
}

/// Like [`update_entry`], naming `document_name` in lookup errors.
pub(crate) fn update_named_document(
    document_name: &str,
    document: &str,
    format: RegistryFormat,
    entry_key: &str,
    updates: &FieldUpdates,
) -> Result<String> {
    update_entry(document, format, entry_key, updates).map_err(|err| match err {
        DeployError::EntryNotFound { name, .. } => DeployError::EntryNotFound {
            document: document_name.to_owned(),
            name,
        },
        DeployError::InvalidDocument { reason, .. } => DeployError::InvalidDocument {
            document: document_name.to_owned(),
            reason,
        },
        other => other,
    })
}

fn apply(document: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by_key(|r| r.start);
    let mut out = String::with_capacity(document.len());
    let mut last = 0;
    for Replacement { start, end, text } in replacements {
        out.push_str(&document[last..start]);
        out.push_str(&text);
        last = end;
    }
    out.push_str(&document[last..]);
    out
}
