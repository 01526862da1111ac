use std::char::REPLACEMENT_CHARACTER;

/// Leading digits taken by [`leading_number`]; keeps the result within `u32`.
const MAX_DIGITS: usize = 9;

/// Text encoding selector found in the first byte of text-bearing frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    /// UTF-16 with a byte-order mark.
    Utf16,
    /// UTF-16 big-endian, no byte-order mark.
    Utf16Be,
    Utf8,
    Unknown(u8),
}

impl TextEncoding {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => Self::Latin1,
            1 => Self::Utf16,
            2 => Self::Utf16Be,
            3 => Self::Utf8,
            other => Self::Unknown(other),
        }
    }

    /// Whether strings in this encoding end with two zero bytes.
    pub fn is_wide(self) -> bool {
        matches!(self, Self::Utf16 | Self::Utf16Be)
    }
}

#[derive(Copy, Clone)]
enum Endian {
    Little,
    Big,
}

/// Decode one terminated string and cut it to at most `max_len` bytes.
pub(super) fn decode_text(encoding: TextEncoding, raw: &[u8], max_len: usize) -> String {
    let text: String = match encoding {
        TextEncoding::Latin1 => until_nul(raw).iter().copied().map(char::from).collect(),
        TextEncoding::Utf16 => match raw {
            [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, Endian::Little),
            [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, Endian::Big),
            _ => decode_utf16(raw, Endian::Little),
        },
        TextEncoding::Utf16Be => decode_utf16(raw, Endian::Big),
        TextEncoding::Utf8 | TextEncoding::Unknown(_) => {
            String::from_utf8_lossy(until_nul(raw)).into_owned()
        }
    };
    truncate_on_char_boundary(text, max_len)
}

fn until_nul(raw: &[u8]) -> &[u8] {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    &raw[..end]
}

fn decode_utf16(raw: &[u8], endian: Endian) -> String {
    let units = raw
        .chunks_exact(2)
        .map(|pair| match endian {
            Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
            Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
        })
        .take_while(|&unit| unit != 0);

    char::decode_utf16(units)
        .map(|r| r.unwrap_or(REPLACEMENT_CHARACTER))
        .collect()
}

/// Shorten `text` to at most `max_len` bytes without splitting a character.
pub(crate) fn truncate_on_char_boundary(mut text: String, max_len: usize) -> String {
    if text.len() <= max_len {
        return text;
    }
    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text
}

/// Parse the leading decimal run of `text`, the way track ("7/12") and
/// date ("2021-05-03") fields are read. No digits yields 0.
pub fn leading_number(text: &str) -> u32 {
    text.trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .take(MAX_DIGITS)
        .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
}
