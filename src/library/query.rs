use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::tag::leading_number;

use super::model::CatalogEntry;

/// Text field a [`Filter::Text`] looks at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextField {
    Title,
    Artist,
    Album,
    Genre,
}

impl TextField {
    fn of(self, entry: &CatalogEntry) -> &str {
        let m = &entry.metadata;
        match self {
            Self::Title => &m.title,
            Self::Artist => &m.artist,
            Self::Album => &m.album,
            Self::Genre => &m.genre,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Case-insensitive substring match on one field.
    Text { field: TextField, needle: String },
    /// Exact year match.
    Year(u32),
}

impl Filter {
    /// Build a filter from a kind word (`title`, `artist`, `album`,
    /// `genre`, `year`) and its argument. A year argument is read like a
    /// tag field, so `"1999abc"` means 1999 and `"abc"` means 0.
    pub fn parse(kind: &str, text: &str) -> Option<Self> {
        let field = match kind.to_ascii_lowercase().as_str() {
            "title" => TextField::Title,
            "artist" => TextField::Artist,
            "album" => TextField::Album,
            "genre" => TextField::Genre,
            "year" => return Some(Self::Year(leading_number(text))),
            _ => return None,
        };
        Some(Self::Text {
            field,
            needle: text.to_string(),
        })
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Text { field, needle } => field
                .of(entry)
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::Year(year) => entry.metadata.year == *year,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Title,
    Artist,
    Album,
    Year,
    Genre,
    Track,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "artist" => Ok(Self::Artist),
            "album" => Ok(Self::Album),
            "year" => Ok(Self::Year),
            "genre" => Ok(Self::Genre),
            "track" => Ok(Self::Track),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::Year => "year",
            Self::Genre => "genre",
            Self::Track => "track",
        };
        f.write_str(name)
    }
}

/// Sort by `key`; text keys compare case-insensitively and equal keys fall
/// back to path order, so the result never depends on the input order.
pub fn sort_entries(entries: &mut [Arc<CatalogEntry>], key: SortKey) {
    let text_field = match key {
        SortKey::Year => {
            entries.sort_by(|a, b| {
                a.metadata
                    .year
                    .cmp(&b.metadata.year)
                    .then_with(|| a.path.cmp(&b.path))
            });
            return;
        }
        SortKey::Track => {
            entries.sort_by(|a, b| {
                a.metadata
                    .track_number
                    .cmp(&b.metadata.track_number)
                    .then_with(|| a.path.cmp(&b.path))
            });
            return;
        }
        SortKey::Title => TextField::Title,
        SortKey::Artist => TextField::Artist,
        SortKey::Album => TextField::Album,
        SortKey::Genre => TextField::Genre,
    };

    entries.sort_by_cached_key(|e| (text_field.of(e).to_lowercase(), e.path.clone()));
}
