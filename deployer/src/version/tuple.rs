//! The canonical four-part product version.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A `major.minor.patch.build` product version.
///
/// Each component is a 16-bit word, the width the Windows version resource
/// stores.
///
/// # Examples
///
/// ```
/// use plugin_deployer::version::{BumpKind, VersionTuple};
///
/// let version: VersionTuple = "1.2.3.4".parse()?;
/// assert_eq!(version.bump(BumpKind::Minor), Some("1.2.3.5".parse()?));
/// assert_eq!(version.bump(BumpKind::Major), Some("1.3.0.0".parse()?));
/// assert_eq!("1.2.3.65535".parse::<VersionTuple>()?.bump(BumpKind::Minor), None);
/// assert_eq!(version.comma_separated(), "1,2,3,4");
/// # Ok::<(), plugin_deployer::version::ParseVersionError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionTuple {
    /// Major component.
    pub major: u16,
    /// Minor component.
    pub minor: u16,
    /// Patch component.
    pub patch: u16,
    /// Build component.
    pub build: u16,
}

/// How to bump a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    /// Increment the build component.
    Minor,
    /// Increment the minor component and zero the rest.
    Major,
}

/// A version string did not have four numeric components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version {input:?}: {reason}")]
pub struct ParseVersionError {
    input: String,
    reason: String,
}

impl VersionTuple {
    /// Create a version from its four components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16, build: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Build a version from components in `major, minor, patch, build` order.
    #[must_use]
    pub const fn from_components(components: [u16; 4]) -> Self {
        let [major, minor, patch, build] = components;
        Self::new(major, minor, patch, build)
    }

    /// The components in `major, minor, patch, build` order.
    #[must_use]
    pub const fn components(self) -> [u16; 4] {
        [self.major, self.minor, self.patch, self.build]
    }

    /// The binary resource form, `a,b,c,d`.
    #[must_use]
    pub fn comma_separated(self) -> String {
        format!("{},{},{},{}", self.major, self.minor, self.patch, self.build)
    }

    /// The tag name for this version, `v<a.b.c.d>`.
    #[must_use]
    pub fn tag_name(self) -> String {
        format!("v{self}")
    }

    /// Return the next version according to `kind`, or `None` when the
    /// incremented component would not fit in 16 bits.
    #[must_use]
    pub const fn bump(self, kind: BumpKind) -> Option<Self> {
        match kind {
            BumpKind::Minor => match self.build.checked_add(1) {
                Some(build) => Some(Self::new(self.major, self.minor, self.patch, build)),
                None => None,
            },
            BumpKind::Major => match self.minor.checked_add(1) {
                Some(minor) => Some(Self::new(self.major, minor, 0, 0)),
                None => None,
            },
        }
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

impl FromStr for VersionTuple {
    type Err = ParseVersionError;

    /// Parse either the dotted (`1.2.3.4`) or the comma (`1, 2, 3, 4`) form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason: String| ParseVersionError {
            input: s.to_owned(),
            reason,
        };
        let separator = if s.contains(',') { ',' } else { '.' };
        let parts: Vec<&str> = s.trim().split(separator).map(str::trim).collect();
        let [major, minor, patch, build] = parts.as_slice() else {
            return Err(fail(format!("expected 4 components, got {}", parts.len())));
        };

        let mut components = [0_u16; 4];
        for (slot, part) in components
            .iter_mut()
            .zip([major, minor, patch, build])
        {
            *slot = part
                .parse()
                .map_err(|e| fail(format!("component {part:?}: {e}")))?;
        }
        Ok(Self::from_components(components))
    }
}
