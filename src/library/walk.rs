use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

/// What the directory walker matches and how deep it goes.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Descend into subdirectories. `false` lists only the root itself.
    pub recursive: bool,
    /// Audio extensions, matched case-insensitively, without the dot.
    pub extensions: Vec<String>,
    pub follow_links: bool,
    pub include_hidden: bool,
    pub max_depth: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::from(&LibrarySettings::default())
    }
}

impl From<&LibrarySettings> for WalkOptions {
    fn from(settings: &LibrarySettings) -> Self {
        Self {
            recursive: settings.recursive,
            extensions: normalize_extensions(&settings.extensions),
            follow_links: settings.follow_links,
            include_hidden: settings.include_hidden,
            max_depth: settings.max_depth,
        }
    }
}

impl WalkOptions {
    pub fn with_recursive(&self, recursive: bool) -> Self {
        Self {
            recursive,
            ..self.clone()
        }
    }
}

fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Case-insensitive extension check against already normalized extensions.
pub fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Lazy iterator over matching audio files below a root.
///
/// Siblings are visited in file name order, so two walks over an unchanged
/// tree yield the same sequence. Unreadable directories (including a
/// missing root) are logged and skipped.
pub struct Walk {
    entries: walkdir::IntoIter,
    extensions: Vec<String>,
    include_hidden: bool,
}

impl Iterator for Walk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };

            if !self.include_hidden && entry.depth() > 0 && is_hidden(entry.path()) {
                if entry.file_type().is_dir() {
                    self.entries.skip_current_dir();
                }
                continue;
            }

            let path = entry.path();
            if path.is_file() && is_audio_file(path, &self.extensions) {
                return Some(entry.into_path());
            }
        }
    }
}

pub fn walk(root: &Path, options: &WalkOptions) -> Walk {
    let mut walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if options.recursive {
        options.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    Walk {
        entries: walker.into_iter(),
        extensions: normalize_extensions(&options.extensions),
        include_hidden: options.include_hidden,
    }
}

/// Callback flavour of [`walk`].
pub fn for_each_match(root: &Path, options: &WalkOptions, mut f: impl FnMut(PathBuf)) {
    for path in walk(root, options) {
        f(path);
    }
}
