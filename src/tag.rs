//! ID3v2 tag parsing.
//!
//! Revisions 2.2, 2.3 and 2.4 are understood. Parsing never fails hard: a
//! structurally broken frame ends the frame walk and whatever was decoded up
//! to that point is returned. Only a missing tag yields `None`.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

mod frame;
mod header;
mod image;
mod text;

pub use header::{HEADER_LEN, TagHeader, Version, decode_syncsafe};
pub use image::{CoverArt, FRONT_COVER, ImageFormat, JPEG_SIGNATURE, PNG_SIGNATURE, sniff_image_format};
pub use text::{TextEncoding, leading_number};

pub(crate) use text::truncate_on_char_boundary;

use frame::{FrameRole, Frames};
use image::parse_picture;
use text::decode_text;

/// Byte bounds for the text fields (terminator excluded).
pub const TITLE_MAX: usize = 99;
pub const ARTIST_MAX: usize = 99;
pub const ALBUM_MAX: usize = 99;
pub const GENRE_MAX: usize = 29;
const NUMBER_MAX: usize = 9;

/// Minimum payload sizes below which a picture frame is ignored.
const APIC_MIN: usize = 10;
const PIC_MIN: usize = 4;

/// Metadata extracted from one audio file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    /// 0 when unknown.
    pub year: u32,
    /// 0 when unknown.
    pub track_number: u32,
    /// Filled from the audio decoder, never from the tag. 0 until probed.
    pub duration_secs: u32,
    pub cover: Option<CoverArt>,
}

impl TrackMetadata {
    fn apply_frame(&mut self, role: FrameRole, payload: &[u8], version: Version) {
        if role == FrameRole::Picture {
            let min = match version {
                Version::V22 => PIC_MIN,
                Version::V23 | Version::V24 => APIC_MIN,
            };
            if payload.len() > min {
                if let Some(art) = parse_picture(payload, version) {
                    self.set_cover(art);
                }
            }
            return;
        }

        let [encoding, raw @ ..] = payload else {
            return;
        };
        if raw.is_empty() {
            return;
        }
        let encoding = TextEncoding::from_byte(*encoding);

        match role {
            FrameRole::Title => self.title = decode_text(encoding, raw, TITLE_MAX),
            FrameRole::Artist => self.artist = decode_text(encoding, raw, ARTIST_MAX),
            FrameRole::Album => self.album = decode_text(encoding, raw, ALBUM_MAX),
            FrameRole::Genre => self.genre = decode_text(encoding, raw, GENRE_MAX),
            FrameRole::Year => {
                self.year = leading_number(&decode_text(encoding, raw, NUMBER_MAX));
            }
            FrameRole::Track => {
                self.track_number = leading_number(&decode_text(encoding, raw, NUMBER_MAX));
            }
            FrameRole::Picture => {}
        }
    }

    // A front cover is kept over any later non-front picture.
    fn set_cover(&mut self, art: CoverArt) {
        let keep_current = self
            .cover
            .as_ref()
            .is_some_and(|current| current.is_front_cover() && !art.is_front_cover());
        if !keep_current {
            self.cover = Some(art);
        }
    }
}

/// Parse a tag from the start of `bytes`.
///
/// Returns `None` when no supported tag header is present. Otherwise the
/// returned metadata holds every field decoded before the first invalid or
/// truncated frame.
pub fn parse(bytes: &[u8]) -> Option<TrackMetadata> {
    let header = TagHeader::parse(bytes)?;
    let mut metadata = TrackMetadata::default();

    let Some(start) = header.frames_start(bytes) else {
        return Some(metadata);
    };

    let end = header.total_len().min(bytes.len());
    for frame in Frames::new(&bytes[..end], start, header.version) {
        if let Some(role) = FrameRole::from_id(header.version, frame.id) {
            metadata.apply_frame(role, frame.payload, header.version);
        }
    }

    Some(metadata)
}

/// Read and parse the tag of the file at `path`.
///
/// Only the header and the declared tag body are read, never the audio
/// data. A file shorter than its declared tag is parsed as far as it goes.
pub fn read_tag(path: &Path) -> io::Result<Option<TrackMetadata>> {
    let mut file = File::open(path)?;

    let mut buf = vec![0u8; HEADER_LEN];
    match file.read_exact(&mut buf) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let Some(header) = TagHeader::parse(&buf) else {
        return Ok(None);
    };

    file.take(u64::from(header.size)).read_to_end(&mut buf)?;
    Ok(parse(&buf))
}
