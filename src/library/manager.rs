use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::config::LibrarySettings;
use crate::error::{LibraryError, Result};
use crate::probe::{DurationProbe, LoftyProbe};
use crate::tag::{self, TrackMetadata};

use super::model::{CatalogEntry, Insert, LibraryModel};
use super::query::{Filter, SortKey, sort_entries};
use super::walk::{WalkOptions, walk};

/// Counts from one full scan.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Matching files found by the walk.
    pub discovered: usize,
    /// Files that could not be opened; they still got a placeholder entry.
    pub unreadable: usize,
    /// Paths that were not in the catalog before.
    pub new_entries: usize,
    /// Paths whose existing entry was replaced.
    pub replaced: usize,
}

impl ScanSummary {
    /// Files that were read and catalogued.
    pub fn added(&self) -> usize {
        self.discovered - self.unreadable
    }
}

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Canonical form of a library root, so one directory spelled two ways
/// (`..`, symlinks) never yields two keys for the same file. Falls back to
/// the absolute path when the root cannot be resolved.
fn resolve_root(root: &Path) -> PathBuf {
    fs::canonicalize(root)
        .or_else(|_| std::path::absolute(root))
        .unwrap_or_else(|_| root.to_path_buf())
}

/// Paths to add and remove, computed from a model snapshot and a fresh walk.
#[derive(Debug, Default)]
struct ScanDelta {
    to_add: Vec<PathBuf>,
    to_remove: Vec<PathBuf>,
}

/// Shared access to the catalog: the model behind its lock plus what is
/// needed to load new entries. Cloning shares the same model.
#[derive(Clone)]
pub(crate) struct LibraryHandle {
    model: Arc<Mutex<LibraryModel>>,
    probe: Arc<dyn DurationProbe>,
    walk: WalkOptions,
}

impl LibraryHandle {
    fn lock(&self) -> MutexGuard<'_, LibraryModel> {
        // Entries are replaced whole, so a panic elsewhere cannot leave one torn.
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse the file at `path` into an entry. The flag is `false` when the
    /// file could not be opened; the entry is then a file-name placeholder.
    pub(super) fn load_entry(&self, path: PathBuf) -> (CatalogEntry, bool) {
        let (mut metadata, readable) = match tag::read_tag(&path) {
            Ok(found) => (found.unwrap_or_default(), true),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "unreadable audio file, keeping placeholder");
                (TrackMetadata::default(), false)
            }
        };
        if readable {
            metadata.duration_secs = self.probe.duration_secs(&path);
        }
        (CatalogEntry::new(path, metadata), readable)
    }

    pub(crate) fn full_scan(&self, root: &Path, recursive: bool) -> ScanSummary {
        let root = resolve_root(root);
        let options = self.walk.with_recursive(recursive);
        let mut summary = ScanSummary::default();

        for path in walk(&root, &options) {
            summary.discovered += 1;
            let (entry, readable) = self.load_entry(path);
            if !readable {
                summary.unreadable += 1;
            }
            match self.lock().insert(entry) {
                Insert::New => summary.new_entries += 1,
                Insert::Replaced => summary.replaced += 1,
            }
        }

        info!(
            root = %root.display(),
            discovered = summary.discovered,
            new = summary.new_entries,
            replaced = summary.replaced,
            unreadable = summary.unreadable,
            "full scan finished"
        );
        summary
    }

    fn compute_delta(&self, root: &Path, options: &WalkOptions) -> ScanDelta {
        let known: HashSet<PathBuf> = self.lock().iter().map(|e| e.path.clone()).collect();

        let to_remove = known.iter().filter(|p| !p.is_file()).cloned().collect();
        let to_add = walk(root, options)
            .filter(|p| !known.contains(p))
            .collect();

        ScanDelta { to_add, to_remove }
    }

    pub(crate) fn reconcile_once(&self, root: &Path, recursive: bool) -> ReconcileReport {
        let root = resolve_root(root);
        let options = self.walk.with_recursive(recursive);
        let delta = self.compute_delta(&root, &options);

        let mut report = ReconcileReport::default();
        {
            let mut model = self.lock();
            for path in delta.to_remove {
                if model.remove(&path).is_some() {
                    report.removed.push(path);
                }
            }
        }

        for path in delta.to_add {
            let (entry, _) = self.load_entry(path.clone());
            if self.lock().insert(entry) == Insert::New {
                report.added.push(path);
            }
        }

        if !report.is_empty() {
            info!(
                root = %root.display(),
                added = report.added.len(),
                removed = report.removed.len(),
                "library reconciled"
            );
        }
        report
    }

    fn snapshot(&self) -> Vec<Arc<CatalogEntry>> {
        self.lock().snapshot()
    }
}

/// Owns the catalog and serves its read-only query surface.
///
/// All reads return snapshots of `Arc`-shared entries, so callers never
/// hold the lock and never see an entry change under them.
pub struct LibraryManager {
    handle: LibraryHandle,
    settings: LibrarySettings,
}

impl LibraryManager {
    /// An empty catalog for `root`. Nothing is scanned yet.
    pub fn create(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        let root = resolve_root(&root.into());
        Self {
            handle: LibraryHandle {
                model: Arc::new(Mutex::new(LibraryModel::new(root))),
                probe: Arc::new(LoftyProbe),
                walk: WalkOptions::from(&settings),
            },
            settings,
        }
    }

    /// Replace the duration probe used for newly loaded entries.
    pub fn with_probe(mut self, probe: impl DurationProbe + 'static) -> Self {
        self.handle.probe = Arc::new(probe);
        self
    }

    pub(crate) fn handle(&self) -> LibraryHandle {
        self.handle.clone()
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    pub fn root(&self) -> PathBuf {
        self.handle.lock().root().to_path_buf()
    }

    /// Whether the root names an accessible directory.
    pub fn check_root(&self) -> Result<()> {
        let root = self.root();
        if fs::metadata(&root)?.is_dir() {
            Ok(())
        } else {
            Err(LibraryError::NotADirectory(root))
        }
    }

    /// Full scan of the configured root with the configured recursion.
    pub fn scan(&self) -> ScanSummary {
        self.full_scan(&self.root(), self.settings.recursive)
    }

    /// Walk `root`, parse every matching file and insert it.
    ///
    /// A path already in the catalog is replaced, never duplicated. Files
    /// that cannot be opened still get an entry titled with their file
    /// name but are not counted by [`ScanSummary::added`]. A root that
    /// cannot be enumerated yields an empty summary.
    pub fn full_scan(&self, root: &Path, recursive: bool) -> ScanSummary {
        self.handle.full_scan(root, recursive)
    }

    /// One reconciliation pass: drop entries whose file is gone, then add
    /// files under `root` that are not catalogued yet.
    pub fn reconcile_once(&self, root: &Path, recursive: bool) -> ReconcileReport {
        self.handle.reconcile_once(root, recursive)
    }

    pub fn len(&self) -> usize {
        self.handle.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handle.lock().is_empty()
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> Vec<Arc<CatalogEntry>> {
        self.handle.snapshot()
    }

    pub fn find(&self, path: &Path) -> Option<Arc<CatalogEntry>> {
        self.handle.lock().get(path).cloned()
    }

    /// Entries matching `filter`, in catalog order.
    pub fn filter(&self, filter: &Filter) -> Vec<Arc<CatalogEntry>> {
        let mut entries = self.handle.snapshot();
        entries.retain(|e| filter.matches(e));
        entries
    }

    /// All entries ordered by `key`, ties broken by path.
    pub fn sorted(&self, key: SortKey) -> Vec<Arc<CatalogEntry>> {
        let mut entries = self.handle.snapshot();
        sort_entries(&mut entries, key);
        entries
    }
}
