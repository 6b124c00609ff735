//! Working copy revision fingerprints

use std::fmt;

use serde::{Deserialize, Serialize};

/// Character `hg id` appends to the changeset id when the working copy has
/// uncommitted modifications
pub const DIRTY_MARKER: char = '+';

/// Output of `hg id -b -i -t`: changeset id, branch and tags
///
/// Two fingerprints are compared as plain strings to detect change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionFingerprint(String);

impl RevisionFingerprint {
    /// Build a fingerprint from raw `hg id` output, trimming whitespace
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Fingerprint used before a repository exists
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the working copy had uncommitted modifications
    pub fn is_dirty(&self) -> bool {
        self.0.contains(DIRTY_MARKER)
    }

    /// Whether this fingerprint was never captured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The fingerprint text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RevisionFingerprint> for String {
    fn from(fp: RevisionFingerprint) -> Self {
        fp.0
    }
}
