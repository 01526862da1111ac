use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::tag::{TITLE_MAX, TrackMetadata, truncate_on_char_boundary};

/// Genre recorded when the tag names none.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// One catalogued audio file. Never mutated once built; updates replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub metadata: TrackMetadata,
}

impl CatalogEntry {
    /// Build an entry, filling a missing title from the file name and a
    /// missing genre with [`UNKNOWN_GENRE`].
    pub fn new(path: PathBuf, mut metadata: TrackMetadata) -> Self {
        if metadata.title.trim().is_empty() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            metadata.title = truncate_on_char_boundary(name, TITLE_MAX);
        }
        if metadata.genre.trim().is_empty() {
            metadata.genre = UNKNOWN_GENRE.to_string();
        }
        Self { path, metadata }
    }

    /// "Artist - Title", or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        let title = self.metadata.title.trim();
        match self.metadata.artist.trim() {
            "" => title.to_string(),
            artist => format!("{artist} - {title}"),
        }
    }
}

/// Outcome of [`LibraryModel::insert`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Insert {
    New,
    /// An entry with the same path existed and was replaced in place.
    Replaced,
}

/// Insertion-ordered catalog keyed by path.
///
/// Entries live in a sequence-keyed map so removal and lookup by path are
/// logarithmic, and iteration keeps discovery order.
#[derive(Debug, Default)]
pub struct LibraryModel {
    root: PathBuf,
    entries: BTreeMap<u64, Arc<CatalogEntry>>,
    index: HashMap<PathBuf, u64>,
    next_seq: u64,
}

impl LibraryModel {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<&Arc<CatalogEntry>> {
        self.index.get(path).and_then(|seq| self.entries.get(seq))
    }

    /// Append `entry`, or replace the existing entry with the same path
    /// while keeping its position.
    pub fn insert(&mut self, entry: CatalogEntry) -> Insert {
        if let Some(&seq) = self.index.get(&entry.path) {
            self.entries.insert(seq, Arc::new(entry));
            return Insert::Replaced;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(entry.path.clone(), seq);
        self.entries.insert(seq, Arc::new(entry));
        Insert::New
    }

    pub fn remove(&mut self, path: &Path) -> Option<Arc<CatalogEntry>> {
        let seq = self.index.remove(path)?;
        self.entries.remove(&seq)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CatalogEntry>> {
        self.entries.values()
    }

    /// Cheap copy of the current entries, in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<CatalogEntry>> {
        self.entries.values().cloned().collect()
    }
}
