//! Fixed-domain set of protocol versions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::version::ProtocolVersion;

const _: () = assert!(ProtocolVersion::ALL.len() <= 64, "VersionSet mask holds 64 releases");

/// A set of releases stored as a bitmask over release ordinals.
///
/// Membership is O(1) and iteration yields releases oldest first. The
/// [`ProtocolVersion::Unknown`] sentinel can never be inserted.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VersionSet(u64);

impl VersionSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Insert a release. Returns `true` if it was newly added.
    pub fn insert(&mut self, version: ProtocolVersion) -> bool {
        match version.ordinal() {
            Some(i) => {
                let bit = 1u64 << i;
                let added = self.0 & bit == 0;
                self.0 |= bit;
                added
            }
            None => false,
        }
    }

    /// Check membership.
    pub fn contains(&self, version: ProtocolVersion) -> bool {
        version
            .ordinal()
            .map(|i| self.0 & (1u64 << i) != 0)
            .unwrap_or(false)
    }

    /// Number of releases in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Releases present in both sets.
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Iterate members oldest first.
    pub fn iter(&self) -> impl Iterator<Item = ProtocolVersion> + '_ {
        ProtocolVersion::ALL
            .iter()
            .copied()
            .filter(move |v| self.contains(*v))
    }

    /// Raw ordinal mask.
    pub fn bits(&self) -> u64 {
        self.0
    }
}

impl Extend<ProtocolVersion> for VersionSet {
    fn extend<I: IntoIterator<Item = ProtocolVersion>>(&mut self, iter: I) {
        for version in iter {
            self.insert(version);
        }
    }
}

impl FromIterator<ProtocolVersion> for VersionSet {
    fn from_iter<I: IntoIterator<Item = ProtocolVersion>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl fmt::Debug for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|v| v.release())).finish()
    }
}

impl Serialize for VersionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for VersionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let versions = Vec::<ProtocolVersion>::deserialize(deserializer)?;
        Ok(versions.into_iter().collect())
    }
}
