/// Length of the fixed tag header: magic, version, revision, flags, size.
pub const HEADER_LEN: usize = 10;

const MAGIC: &[u8; 3] = b"ID3";
const FLAG_EXTENDED_HEADER: u8 = 0x40;

/// Decode a 28-bit "syncsafe" integer (7 significant bits per byte).
pub fn decode_syncsafe(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Major tag revision. Only these three are understood.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// 3-byte frame ids, 3-byte big-endian frame sizes.
    V22,
    /// 4-byte frame ids, plain 4-byte big-endian frame sizes.
    V23,
    /// 4-byte frame ids, syncsafe frame sizes.
    V24,
}

impl Version {
    fn from_major(major: u8) -> Option<Self> {
        match major {
            2 => Some(Self::V22),
            3 => Some(Self::V23),
            4 => Some(Self::V24),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TagHeader {
    pub version: Version,
    pub revision: u8,
    pub flags: u8,
    /// Size of everything after the header, as declared.
    pub size: u32,
}

impl TagHeader {
    /// Parse the fixed header at the start of `bytes`.
    ///
    /// Returns `None` when the magic marker is missing, the buffer is too
    /// short or the major version is not 2, 3 or 4.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw: &[u8; HEADER_LEN] = bytes.get(..HEADER_LEN)?.try_into().ok()?;
        if &raw[..3] != MAGIC {
            return None;
        }
        let version = Version::from_major(raw[3])?;

        Some(Self {
            version,
            revision: raw[4],
            flags: raw[5],
            size: decode_syncsafe([raw[6], raw[7], raw[8], raw[9]]),
        })
    }

    /// Header plus declared body length.
    pub fn total_len(&self) -> usize {
        HEADER_LEN + self.size as usize
    }

    /// Offset of the first frame, skipping an extended header if flagged.
    ///
    /// `None` means the extended header is unreadable or overruns the tag.
    pub(super) fn frames_start(&self, bytes: &[u8]) -> Option<usize> {
        if self.version == Version::V22 || self.flags & FLAG_EXTENDED_HEADER == 0 {
            return Some(HEADER_LEN);
        }

        let size: [u8; 4] = bytes.get(HEADER_LEN..HEADER_LEN + 4)?.try_into().ok()?;
        let ext_len = match self.version {
            // v2.3 counts only the bytes after the size field.
            Version::V23 => u32::from_be_bytes(size) as usize + 4,
            _ => decode_syncsafe(size) as usize,
        };

        let start = HEADER_LEN.checked_add(ext_len)?;
        (start <= self.total_len()).then_some(start)
    }
}
