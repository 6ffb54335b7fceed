//! Version core parsing.
//!
//! Release decisions only ever compare the numeric `major.minor.patch`
//! prefix of a version; pre-release qualifiers and build metadata are
//! ignored.

use regex::Regex;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static CORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("core version pattern is valid")
});

/// The numeric `major.minor.patch` prefix of a version string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionCore(Version);

impl VersionCore {
    /// Parses the core of `version`.
    ///
    /// A leading `v` is tolerated and missing minor or patch components
    /// count as zero, so `"2"` and `"v2.0.0-beta.1"` share the core `2.0.0`.
    /// Returns `None` when the string does not start with a number.
    #[must_use]
    pub fn parse(version: &str) -> Option<Self> {
        let caps = CORE_PATTERN.captures(version.trim())?;
        let component = |idx: usize| -> Option<u64> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse().ok(),
                None => Some(0),
            }
        };

        Some(Self(Version::new(component(1)?, component(2)?, component(3)?)))
    }

    /// Major component.
    #[must_use]
    pub fn major(&self) -> u64 {
        self.0.major
    }

    /// Minor component.
    #[must_use]
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Patch component.
    #[must_use]
    pub fn patch(&self) -> u64 {
        self.0.patch
    }
}

impl PartialOrd for VersionCore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionCore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for VersionCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns true if `version` carries a `-` qualifier after its core.
#[must_use]
pub fn has_pre_release_qualifier(version: &str) -> bool {
    version.contains('-')
}

/// Returns true if `version` is a Maven snapshot version.
#[must_use]
pub fn is_maven_snapshot(version: &str) -> bool {
    version.ends_with("-SNAPSHOT")
}
