//! Change-detection fingerprints
//!
//! A fingerprint is built from a file's modification time and byte size. It
//! is only ever compared for equality: a file rewritten with the same size and
//! mtime is considered unchanged.

use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Opaque change-detection token for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of the file at `path`
    ///
    /// Never fails: a file that cannot be stat-ed yields the invalid
    /// fingerprint, which callers must not store.
    pub fn of_file(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(metadata) => Self::from_metadata(&metadata),
            Err(e) => {
                tracing::debug!("Cannot stat {}: {}", path.display(), e);
                Self::invalid()
            }
        }
    }

    /// Computes the fingerprint from already-fetched metadata
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(_) => return Self::invalid(),
        };

        let mtime = match modified.duration_since(UNIX_EPOCH) {
            Ok(since) => format!("{}.{:09}", since.as_secs(), since.subsec_nanos()),
            Err(e) => {
                let before = e.duration();
                format!("-{}.{:09}", before.as_secs(), before.subsec_nanos())
            }
        };

        Self(format!("{}-{}", mtime, metadata.len()))
    }

    /// The sentinel used when no fingerprint could be computed
    pub fn invalid() -> Self {
        Self(String::new())
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
