//! Fixture helpers shared by the unit tests.

use std::fs;
use std::path::Path;

fn syncsafe(n: u32) -> [u8; 4] {
    [
        ((n >> 21) & 0x7F) as u8,
        ((n >> 14) & 0x7F) as u8,
        ((n >> 7) & 0x7F) as u8,
        (n & 0x7F) as u8,
    ]
}

/// A v2.3 tag with UTF-8 text frames for every `(id, value)` pair.
pub fn id3v23(frames: &[(&[u8; 4], &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, value) in frames {
        let size = value.len() as u32 + 1;
        body.extend_from_slice(&id[..]);
        body.extend_from_slice(&size.to_be_bytes());
        body.extend_from_slice(&[0, 0, 3]);
        body.extend_from_slice(value.as_bytes());
    }

    let mut out = b"ID3\x03\x00\x00".to_vec();
    out.extend_from_slice(&syncsafe(body.len() as u32));
    out.extend_from_slice(&body);
    out
}

/// Write a fake audio file carrying a tag with title and artist.
pub fn write_track(path: &Path, title: &str, artist: &str) {
    let mut bytes = id3v23(&[(b"TIT2", title), (b"TPE1", artist)]);
    bytes.extend_from_slice(b"not really audio");
    fs::write(path, bytes).unwrap();
}

/// Write a fake audio file with the given tag frames.
pub fn write_tagged(path: &Path, frames: &[(&[u8; 4], &str)]) {
    let mut bytes = id3v23(frames);
    bytes.extend_from_slice(b"not really audio");
    fs::write(path, bytes).unwrap();
}
