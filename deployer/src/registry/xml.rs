//! Field patching for the XML plugin manager list.
//!
//! An entry looks like
//!
//! ```xml
//! <plugin name="DSpellCheck">
//!     <x64Version>1.4.0.0</x64Version>
//!     <download>https://example.org/DSpellCheck_x64.zip</download>
//! </plugin>
//! ```
//!
//! Only the text between a field's start and end tags is rewritten.

use super::{FieldUpdates, Replacement};
use crate::error::{DeployError, Result};
use crate::pattern::compile_regex;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

const PLUGIN_CLOSE: &str = "</plugin>";

static PLUGIN_OPEN: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"<plugin\b([^>]*)>", "plugin tag pattern should compile"));

static NAME_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    compile_regex(
        r#"\bname\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        "name attribute pattern should compile",
    )
});

/// Compute the replacements that set each field of `entry_key`.
pub(crate) fn plan_updates(
    document: &str,
    entry_key: &str,
    updates: &FieldUpdates,
) -> Result<Vec<Replacement>> {
    let body = entry_body(document, entry_key)?;
    let mut replacements = Vec::new();

    for (field, value) in updates.iter() {
        let range = field_value(document, body.clone(), field).ok_or_else(|| {
            DeployError::FieldNotFound {
                name: entry_key.to_owned(),
                field: field.to_owned(),
            }
        })?;
        if unescape(&document[range.clone()]) == value {
            continue;
        }
        replacements.push(Replacement {
            start: range.start,
            end: range.end,
            text: escape(value),
        });
    }
    Ok(replacements)
}

/// The byte range between `<plugin name="entry_key">` and its `</plugin>`.
fn entry_body(document: &str, entry_key: &str) -> Result<Range<usize>> {
    let not_found = || DeployError::EntryNotFound {
        document: super::RegistryFormat::Xml.to_string(),
        name: entry_key.to_owned(),
    };

    let open = PLUGIN_OPEN
        .captures_iter(document)
        .find(|caps| {
            caps.get(1)
                .and_then(|attrs| NAME_ATTRIBUTE.captures(attrs.as_str()))
                .and_then(|name| name.get(1).or_else(|| name.get(2)))
                .is_some_and(|name| unescape(name.as_str()) == entry_key)
        })
        .and_then(|caps| caps.get(0))
        .ok_or_else(not_found)?;

    if open.as_str().ends_with("/>") {
        return Ok(open.end()..open.end());
    }
    let close = document[open.end()..]
        .find(PLUGIN_CLOSE)
        .ok_or_else(|| DeployError::InvalidDocument {
            document: super::RegistryFormat::Xml.to_string(),
            reason: format!("plugin {entry_key} has no closing tag"),
        })?;
    Ok(open.end()..open.end() + close)
}

/// The byte range of `field`'s text content within `body`.
fn field_value(document: &str, body: Range<usize>, field: &str) -> Option<Range<usize>> {
    let pattern = Regex::new(&format!(r"<{}(?:\s[^>]*)?>", regex::escape(field))).ok()?;
    let scope = &document[body.clone()];
    let open = pattern.find(scope)?;
    if open.as_str().ends_with("/>") {
        return None;
    }
    let close_tag = format!("</{field}>");
    let close = scope[open.end()..].find(&close_tag)?;
    let start = body.start + open.end();
    Some(start..start + close)
}

/// Escape `value` for use as element text.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Resolve the predefined and numeric character references in `text`.
///
/// Unknown references are kept literally.
#[must_use]
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|semi| Some((resolve(&tail[1..semi])?, semi))) {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => entity.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryFormat, update_entry};
    use rstest::rstest;

    const DOCUMENT: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n",
        "<plugins>\r\n",
        "\t<plugin name=\"Compare\">\r\n",
        "\t\t<x64Version>2.0.0.0</x64Version>\r\n",
        "\t</plugin>\r\n",
        "\t<plugin name=\"DSpellCheck\">\r\n",
        "\t\t<unicodeVersion>1.4.0.0</unicodeVersion>\r\n",
        "\t\t<x64Version>1.4.0.0</x64Version>\r\n",
        "\t\t<download>https://example.org/v1.4.0.0/DSpellCheck_x64.zip</download>\r\n",
        "\t\t<latestUpdate>Old notes.</latestUpdate>\r\n",
        "\t</plugin>\r\n",
        "</plugins>\r\n",
    );

    fn updates() -> FieldUpdates {
        FieldUpdates::new()
            .with("x64Version", "1.4.0.1")
            .with("latestUpdate", "Fixed <b> & more.\\nFaster.")
    }

    #[test]
    fn only_targeted_values_change() {
        let patched =
            update_entry(DOCUMENT, RegistryFormat::Xml, "DSpellCheck", &updates()).expect("patch");

        let expected = DOCUMENT
            .replace(
                "<x64Version>1.4.0.0</x64Version>",
                "<x64Version>1.4.0.1</x64Version>",
            )
            .replace(
                "<latestUpdate>Old notes.</latestUpdate>",
                "<latestUpdate>Fixed &lt;b&gt; &amp; more.\\nFaster.</latestUpdate>",
            );
        assert_eq!(patched, expected);
        assert!(patched.contains("<x64Version>2.0.0.0</x64Version>"));
    }

    #[test]
    fn second_patch_is_identity() {
        let once =
            update_entry(DOCUMENT, RegistryFormat::Xml, "DSpellCheck", &updates()).expect("patch");
        let twice =
            update_entry(&once, RegistryFormat::Xml, "DSpellCheck", &updates()).expect("patch");
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_entry_is_not_created() {
        let err = update_entry(DOCUMENT, RegistryFormat::Xml, "NppFTP", &updates())
            .expect_err("no such plugin");
        assert!(matches!(err, DeployError::EntryNotFound { ref name, .. } if name == "NppFTP"));
    }

    #[test]
    fn missing_field_is_reported() {
        let updates = FieldUpdates::new().with("x86Version", "1.4.0.1");
        let err = update_entry(DOCUMENT, RegistryFormat::Xml, "DSpellCheck", &updates)
            .expect_err("no such field");
        assert!(matches!(err, DeployError::FieldNotFound { ref field, .. } if field == "x86Version"));
    }

    #[test]
    fn fields_of_other_entries_are_not_used() {
        let document = "<plugins><plugin name=\"DSpellCheck\"></plugin><plugin name=\"X\"><download>u</download></plugin></plugins>";
        let updates = FieldUpdates::new().with("download", "v");
        let err = update_entry(document, RegistryFormat::Xml, "DSpellCheck", &updates)
            .expect_err("field belongs to another entry");
        assert!(matches!(err, DeployError::FieldNotFound { .. }));
    }

    #[test]
    fn field_names_match_whole_tags() {
        let document = "<plugin name=\"P\"><downloadMirror>m</downloadMirror><download>old</download></plugin>";
        let updates = FieldUpdates::new().with("download", "new");
        let patched = update_entry(document, RegistryFormat::Xml, "P", &updates).expect("patch");
        assert_eq!(
            patched,
            "<plugin name=\"P\"><downloadMirror>m</downloadMirror><download>new</download></plugin>"
        );
    }

    #[rstest]
    #[case::plain("a < b & c > d")]
    #[case::quotes("say \"hi\" it's")]
    fn escape_then_unescape_restores_text(#[case] text: &str) {
        assert_eq!(unescape(&escape(text)), text);
    }

    #[rstest]
    #[case::numeric("&#65;&#x42;", "AB")]
    #[case::unknown("&nbsp; &", "&nbsp; &")]
    #[case::attribute_quotes("&quot;x&apos;", "\"x'")]
    fn unescape_handles_references(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(unescape(text), expected);
    }
}
