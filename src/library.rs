//! The in-memory catalog: model, directory walker, manager and queries.

mod manager;
mod model;
mod query;
mod walk;

pub(crate) use manager::LibraryHandle;
pub use manager::{LibraryManager, ReconcileReport, ScanSummary};
pub use model::{CatalogEntry, Insert, LibraryModel, UNKNOWN_GENRE};
pub use query::{Filter, SortKey, TextField, sort_entries};
pub use walk::{Walk, WalkOptions, for_each_match, is_audio_file, walk};
