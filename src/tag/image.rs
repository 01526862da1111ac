use std::sync::Arc;

use super::header::Version;
use super::text::TextEncoding;

pub const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Picture role byte for the front cover.
pub const FRONT_COVER: u8 = 3;

/// Image format, decided by signature sniffing rather than the declared MIME type.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    None,
    Jpeg,
    Png,
    /// Some bytes are present but match no known signature.
    Other,
}

/// Embedded cover image.
///
/// The bytes are shared, so cloning an entry or taking a catalog snapshot
/// never copies image data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub data: Arc<[u8]>,
    pub format: ImageFormat,
    /// Picture role byte (0 = other, 3 = front cover, ...).
    pub role: u8,
    pub mime: String,
}

impl CoverArt {
    pub fn is_front_cover(&self) -> bool {
        self.role == FRONT_COVER
    }
}

pub fn sniff_image_format(data: &[u8]) -> ImageFormat {
    if data.is_empty() {
        ImageFormat::None
    } else if data.starts_with(&JPEG_SIGNATURE) {
        ImageFormat::Jpeg
    } else if data.starts_with(&PNG_SIGNATURE) {
        ImageFormat::Png
    } else {
        ImageFormat::Other
    }
}

/// Parse an APIC (v2.3/v2.4) or PIC (v2.2) payload.
///
/// Layout: encoding byte, MIME type (v2.2: fixed three-letter format),
/// role byte, terminated description, image bytes. Returns `None` when a
/// terminator is missing or no image bytes remain.
pub(super) fn parse_picture(payload: &[u8], version: Version) -> Option<CoverArt> {
    let (&encoding, rest) = payload.split_first()?;
    let encoding = TextEncoding::from_byte(encoding);

    let (mime, rest) = match version {
        Version::V22 => {
            let format = rest.get(..3)?;
            (legacy_mime(format), &rest[3..])
        }
        Version::V23 | Version::V24 => {
            let nul = rest.iter().position(|&b| b == 0)?;
            (
                String::from_utf8_lossy(&rest[..nul]).into_owned(),
                &rest[nul + 1..],
            )
        }
    };

    let (&role, rest) = rest.split_first()?;
    let data = skip_description(rest, encoding)?;
    if data.is_empty() {
        return None;
    }

    Some(CoverArt {
        data: Arc::from(data),
        format: sniff_image_format(data),
        role,
        mime,
    })
}

fn legacy_mime(format: &[u8]) -> String {
    match format.to_ascii_uppercase().as_slice() {
        b"JPG" => "image/jpeg".to_string(),
        b"PNG" => "image/png".to_string(),
        other => String::from_utf8_lossy(other).into_owned(),
    }
}

fn skip_description(raw: &[u8], encoding: TextEncoding) -> Option<&[u8]> {
    if encoding.is_wide() {
        let end = raw
            .chunks_exact(2)
            .position(|pair| pair == [0, 0])?;
        Some(&raw[end * 2 + 2..])
    } else {
        let end = raw.iter().position(|&b| b == 0)?;
        Some(&raw[end + 1..])
    }
}
