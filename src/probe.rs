//! Track duration lookup.
//!
//! Durations come from the audio decoding stack, never from the tag, so
//! this is kept behind a small trait the catalog can be built without.

use std::path::Path;

use lofty::prelude::AudioFile;
use tracing::debug;

pub trait DurationProbe: Send + Sync {
    /// Whole seconds of audio in the file at `path`, or 0 when unknown.
    fn duration_secs(&self, path: &Path) -> u32;
}

/// Reads stream properties with `lofty`.
#[derive(Debug, Copy, Clone, Default)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn duration_secs(&self, path: &Path) -> u32 {
        match lofty::read_from_path(path) {
            Ok(tagged) => {
                u32::try_from(tagged.properties().duration().as_secs()).unwrap_or(u32::MAX)
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no duration available");
                0
            }
        }
    }
}

/// Leaves every duration at 0.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoProbe;

impl DurationProbe for NoProbe {
    fn duration_secs(&self, _path: &Path) -> u32 {
        0
    }
}
