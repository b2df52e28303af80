//! Target architectures for the plugin build.
//!
//! The release always covers the same two Windows targets, built in a fixed
//! order. Each architecture knows the tag used in directory and archive names
//! and the generator platform CMake expects for it.

use std::fmt;

/// A Windows architecture the plugin is released for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Architecture {
    /// 64-bit x86.
    X64,
    /// 32-bit x86.
    X86,
}

impl Architecture {
    /// Every architecture in build order.
    pub const ALL: [Self; 2] = [Self::X64, Self::X86];

    /// Short tag used in build directories, archive names and registry
    /// document names (`x64`, `x86`).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::X86 => "x86",
        }
    }

    /// Platform name passed to `cmake -A`.
    #[must_use]
    pub const fn generator_platform(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::X86 => "Win32",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn build_order_starts_with_x64() {
        assert_eq!(Architecture::ALL, [Architecture::X64, Architecture::X86]);
    }

    #[rstest]
    #[case::x64(Architecture::X64, "x64", "x64")]
    #[case::x86(Architecture::X86, "x86", "Win32")]
    fn tags_and_platforms(
        #[case] arch: Architecture,
        #[case] tag: &str,
        #[case] platform: &str,
    ) {
        assert_eq!(arch.tag(), tag);
        assert_eq!(arch.to_string(), tag);
        assert_eq!(arch.generator_platform(), platform);
    }
}
