//! On-disk file identity, used to keep one path per physical file.
//!
//! A hardlink, a followed symlink, or a file reached through a symlinked
//! directory all name a file the walk may already have recorded. Such
//! aliases are not duplicates: removing one of them can remove the only
//! real copy. [`SeenFiles`] remembers the `(device, inode)` pair of every
//! recorded file so later aliases can be dropped. The walker keeps a second
//! set for files it must never record, whatever path reaches them.
//!
//! Only Unix exposes the identity through [`Metadata`]; elsewhere every
//! file counts as distinct.

use std::collections::HashSet;
use std::fs::Metadata;

/// Identities of the files recorded so far.
///
/// Not thread-safe; the walker keeps one per walk on the consuming thread.
#[derive(Debug, Default)]
pub struct SeenFiles {
    seen: HashSet<FileId>,
}

impl SeenFiles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file and report whether this is its first sighting.
    ///
    /// Returns `true` when the identity is unknown (including on platforms
    /// without one), `false` when the metadata names an already-recorded file.
    pub fn first_sighting(&mut self, metadata: &Metadata) -> bool {
        match FileId::from_metadata(metadata) {
            Some(id) => self.seen.insert(id),
            None => true,
        }
    }

    /// Record a file without asking whether it was seen before.
    pub fn insert(&mut self, metadata: &Metadata) {
        if let Some(id) = FileId::from_metadata(metadata) {
            self.seen.insert(id);
        }
    }

    /// Whether the metadata names a recorded file. Always false where
    /// identities are unavailable.
    #[must_use]
    pub fn contains(&self, metadata: &Metadata) -> bool {
        FileId::from_metadata(metadata).is_some_and(|id| self.seen.contains(&id))
    }

    /// Number of distinct files recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FileId {
    dev: u64,
    ino: u64,
}

impl FileId {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}
