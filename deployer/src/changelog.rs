//! Release-notes excerpts from the changelog.
//!
//! The changelog is a plain text file where each release starts with a line
//! naming `v<version>` and its notes run until the next blank line.

use crate::error::{DeployError, Result};

/// Return the notes for `version`, trimmed, with line breaks escaped as the
/// two characters `\n`.
///
/// The heading must name exactly `v<version>`: `v2.1.0` does not match a
/// `v2.1.0.1` or `v2.1.01` heading.
///
/// # Errors
///
/// Returns [`DeployError::ChangelogEntryNotFound`] if no heading names the
/// version.
///
/// # Examples
///
/// ```
/// use plugin_deployer::changelog::extract_excerpt;
///
/// let changelog = "v2.1.0\nFixed bug A.\nFixed bug B.\n\nv2.0.9\nOlder.\n";
/// assert_eq!(extract_excerpt(changelog, "2.1.0")?, r"Fixed bug A.\nFixed bug B.");
/// # Ok::<(), plugin_deployer::error::DeployError>(())
/// ```
pub fn extract_excerpt(changelog: &str, version: &str) -> Result<String> {
    let normalised = changelog.replace("\r\n", "\n");
    let needle = format!("v{version}");

    let mut lines = normalised.lines();
    if !lines.by_ref().any(|line| names_version(line, &needle)) {
        return Err(DeployError::ChangelogEntryNotFound {
            version: version.to_owned(),
        });
    }

    let section: Vec<&str> = lines.take_while(|line| !line.trim().is_empty()).collect();
    Ok(section.join("\n").trim().replace('\n', "\\n"))
}

fn names_version(line: &str, needle: &str) -> bool {
    line.match_indices(needle).any(|(start, _)| {
        let rest = &line[start + needle.len()..];
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if c.is_ascii_digit() => false,
            Some('.') => !chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => true,
        }
    })
}
