//! Line-oriented command shell over a [`LibraryManager`].
//!
//! The shell keeps a view of the catalog (the whole catalog, or the result
//! of the last filter) and remembers the last listing so `info N` always
//! refers to the number printed by `list`, even if the reconciler changed
//! the catalog in between.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::config::{ReconcileSettings, Settings};
use crate::library::{CatalogEntry, Filter, LibraryManager, SortKey, sort_entries};
use crate::reconcile::Reconciler;
use crate::tag::{CoverArt, FRONT_COVER, ImageFormat};

const UNKNOWN_ARTIST: &str = "Unknown artist";
const UNKNOWN_TITLE: &str = "Unknown title";
const BACK_COVER: u8 = 4;

/// Whether the shell keeps reading commands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    library: LibraryManager,
    settings: Settings,
    reconciler: Option<Reconciler>,
    /// Result of the last `filter`, until `reset` or `scan`.
    filtered: Option<Vec<Arc<CatalogEntry>>>,
    /// Order applied to the whole catalog view.
    sort: Option<SortKey>,
    /// What the last `list` printed.
    listing: Option<Vec<Arc<CatalogEntry>>>,
}

impl Shell {
    pub fn new(root: impl Into<PathBuf>, settings: Settings) -> Self {
        let library = LibraryManager::create(root, settings.library.clone());
        Self::with_library(library, settings)
    }

    pub fn with_library(library: LibraryManager, settings: Settings) -> Self {
        Self {
            library,
            settings,
            reconciler: None,
            filtered: None,
            sort: None,
            listing: None,
        }
    }

    pub fn library(&self) -> &LibraryManager {
        &self.library
    }

    /// Whether background reconciliation is running.
    pub fn is_monitoring(&self) -> bool {
        self.reconciler.as_ref().is_some_and(Reconciler::is_active)
    }

    /// Scan the root, then execute commands from `input` until `quit` or
    /// end of input. The reconciler is stopped before returning.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        let root = self.library.root();
        if let Err(err) = self.library.check_root() {
            writeln!(out, "Warning: cannot read {}: {err}", root.display())?;
        }
        writeln!(out, "Scanning directory: {}", root.display())?;
        let summary = self.library.scan();
        writeln!(out, "Found {} audio files.", summary.added())?;

        if self.settings.reconcile.autostart {
            self.monitor("", out)?;
        }
        write_help(out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "\n> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            if self.execute(&line?, out)? == Flow::Quit {
                break;
            }
        }

        if let Some(mut reconciler) = self.reconciler.take() {
            reconciler.stop();
        }
        Ok(())
    }

    /// Run one command line.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        let (command, rest) = split_word(line);
        debug!(command, args = rest, "shell command");

        match command {
            "scan" => self.scan(rest, out)?,
            "monitor" => self.monitor(rest, out)?,
            "stop" => self.stop(out)?,
            "list" => self.list(out)?,
            "info" => self.info(rest, out)?,
            "sort" => self.sort(rest, out)?,
            "filter" => self.filter(rest, out)?,
            "reset" => {
                self.filtered = None;
                self.listing = None;
                writeln!(out, "Filter removed. All files will be displayed.")?;
            }
            "config" => match self.settings.to_toml() {
                Ok(text) => write!(out, "{text}")?,
                Err(err) => writeln!(out, "Cannot render configuration: {err}")?,
            },
            "help" => write_help(out)?,
            "quit" | "exit" => return Ok(Flow::Quit),
            other => writeln!(out, "Unknown command: {other}. Type 'help' for a list.")?,
        }
        Ok(Flow::Continue)
    }

    fn scan<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        let root = match rest {
            "" => self.library.root(),
            dir => PathBuf::from(dir),
        };
        writeln!(out, "Scanning: {}", root.display())?;
        let summary = self.library.full_scan(&root, self.settings.library.recursive);
        writeln!(out, "Found {} audio files.", summary.added())?;

        self.filtered = None;
        self.listing = None;
        Ok(())
    }

    /// `monitor [secs] [dir]`: a leading number is the interval, anything
    /// else is the directory.
    fn monitor<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        if self.is_monitoring() {
            writeln!(out, "Continuous scanning is already active.")?;
            return Ok(());
        }

        let mut settings: ReconcileSettings = self.settings.reconcile.clone();
        let (first, tail) = split_word(rest);
        let dir = match first.parse::<i64>() {
            Ok(secs) => {
                settings.interval_secs = secs;
                tail
            }
            Err(_) => rest,
        };

        let mut reconciler = Reconciler::new(&self.library, &settings);
        if !dir.is_empty() {
            reconciler = reconciler.with_root(dir);
        }
        let secs = reconciler.interval().as_secs();
        if dir.is_empty() {
            writeln!(out, "Starting continuous scanning (interval: {secs} seconds)...")?;
        } else {
            writeln!(
                out,
                "Starting continuous scanning (interval: {secs} seconds, directory: {dir})..."
            )?;
        }
        reconciler.start();
        self.reconciler = Some(reconciler);
        Ok(())
    }

    fn stop<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.reconciler.take() {
            Some(mut reconciler) if reconciler.is_active() => {
                writeln!(out, "Stopping continuous scanning...")?;
                reconciler.stop();
                writeln!(out, "Continuous scanning stopped.")?;
            }
            _ => writeln!(out, "Continuous scanning is not active.")?,
        }
        Ok(())
    }

    /// The entries `list` would print right now.
    fn current_view(&self) -> Vec<Arc<CatalogEntry>> {
        if let Some(filtered) = &self.filtered {
            return filtered.clone();
        }
        let mut entries = self.library.entries();
        if let Some(key) = self.sort {
            sort_entries(&mut entries, key);
        }
        entries
    }

    fn list<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let view = self.current_view();
        let suffix = if self.filtered.is_some() { " (filtered)" } else { "" };
        writeln!(out, "\nAudio files{suffix}:")?;
        for (i, entry) in view.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, list_line(entry))?;
        }
        if view.is_empty() {
            writeln!(out, "No audio files found.")?;
        } else {
            writeln!(out, "Total: {} files.", view.len())?;
        }
        self.listing = Some(view);
        Ok(())
    }

    fn info<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        if rest.is_empty() {
            return writeln!(out, "Specify file number.");
        }
        let index = match rest.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return writeln!(out, "Invalid number."),
        };

        let view = match &self.listing {
            Some(listing) => listing.clone(),
            None => self.current_view(),
        };
        if view.is_empty() {
            return writeln!(out, "No audio files found.");
        }
        let Some(entry) = view.get(index - 1) else {
            return writeln!(out, "Invalid number. There are only {} files.", view.len());
        };
        write_info(entry, out)
    }

    fn sort<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        if rest.is_empty() {
            return writeln!(
                out,
                "Specify sorting criterion (title, artist, album, year, genre, track)."
            );
        }
        let key = match rest.parse::<SortKey>() {
            Ok(key) => key,
            Err(_) => return writeln!(out, "Invalid sorting criterion."),
        };

        writeln!(out, "Sorting by {key}...")?;
        match &mut self.filtered {
            Some(filtered) => sort_entries(filtered, key),
            None => self.sort = Some(key),
        }
        self.listing = None;
        writeln!(out, "Sorting completed.")
    }

    fn filter<W: Write>(&mut self, rest: &str, out: &mut W) -> io::Result<()> {
        let (kind, text) = split_word(rest);
        if kind.is_empty() {
            return writeln!(out, "Specify filter type (title, artist, album, genre, year).");
        }
        if text.is_empty() {
            return writeln!(out, "Specify filter text.");
        }
        let Some(filter) = Filter::parse(kind, text) else {
            return writeln!(out, "Invalid filter type.");
        };

        writeln!(out, "Filtering by {kind} = '{text}'...")?;
        let mut matches = self.library.filter(&filter);
        if let Some(key) = self.sort {
            sort_entries(&mut matches, key);
        }
        writeln!(out, "Found {} matching files.", matches.len())?;
        self.filtered = Some(matches);
        self.listing = None;
        Ok(())
    }
}

/// Split off the first whitespace-separated word; the rest is trimmed.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn or_unknown<'a>(value: &'a str, unknown: &'a str) -> &'a str {
    match value.trim() {
        "" => unknown,
        v => v,
    }
}

fn list_line(entry: &CatalogEntry) -> String {
    let m = &entry.metadata;
    format!(
        "{} - {}",
        or_unknown(&m.artist, UNKNOWN_ARTIST),
        or_unknown(&m.title, UNKNOWN_TITLE)
    )
}

/// Format seconds as `M:SS`.
fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn describe_cover(cover: &CoverArt) -> String {
    let format = match cover.format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Other | ImageFormat::None => "unknown format",
    };
    let role = match cover.role {
        FRONT_COVER => "front cover",
        BACK_COVER => "back cover",
        _ => "other",
    };
    format!("Present ({} bytes, {format}, {role})", cover.data.len())
}

fn write_info<W: Write>(entry: &CatalogEntry, out: &mut W) -> io::Result<()> {
    let m = &entry.metadata;
    writeln!(out, "\nDetailed information:")?;
    writeln!(out, "Title: {}", or_unknown(&m.title, "Unknown"))?;
    writeln!(out, "Artist: {}", or_unknown(&m.artist, "Unknown"))?;
    writeln!(out, "Album: {}", or_unknown(&m.album, "Unknown"))?;
    writeln!(out, "Year: {}", m.year)?;
    writeln!(out, "Genre: {}", or_unknown(&m.genre, "Unknown"))?;
    writeln!(out, "Track: {}", m.track_number)?;
    if m.duration_secs > 0 {
        writeln!(out, "Duration: {}", format_duration(m.duration_secs))?;
    }
    writeln!(out, "Path: {}", entry.path.display())?;
    match &m.cover {
        Some(cover) => writeln!(out, "Album image: {}", describe_cover(cover)),
        None => writeln!(out, "Album image: Not present"),
    }
}

fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\nAvailable commands:")?;
    writeln!(out, "  scan [directory]          - Scan a directory")?;
    writeln!(
        out,
        "  monitor [secs] [dir]      - Start continuous background scanning"
    )?;
    writeln!(out, "  stop                      - Stop continuous scanning")?;
    writeln!(out, "  list                      - Show the current view")?;
    writeln!(out, "  info <number>             - Show details of a listed file")?;
    writeln!(
        out,
        "  sort <key>                - Sort by title, artist, album, year, genre or track"
    )?;
    writeln!(
        out,
        "  filter <kind> <text>      - Filter by title, artist, album, genre or year"
    )?;
    writeln!(out, "  reset                     - Show the whole catalog again")?;
    writeln!(out, "  config                    - Print the effective configuration")?;
    writeln!(out, "  help                      - Show this list")?;
    writeln!(out, "  quit                      - Exit")
}

#[cfg(test)]
mod tests;
