use super::header::Version;

/// Metadata role a recognised frame id maps to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum FrameRole {
    Title,
    Artist,
    Album,
    Year,
    Genre,
    Track,
    Picture,
}

impl FrameRole {
    pub(super) fn from_id(version: Version, id: &[u8]) -> Option<Self> {
        let role = match (version, id) {
            (Version::V22, b"TT2") => Self::Title,
            (Version::V22, b"TP1") => Self::Artist,
            (Version::V22, b"TAL") => Self::Album,
            (Version::V22, b"TYE") => Self::Year,
            (Version::V22, b"TCO") => Self::Genre,
            (Version::V22, b"TRK") => Self::Track,
            (Version::V22, b"PIC") => Self::Picture,
            (Version::V22, _) => return None,
            (_, b"TIT2") => Self::Title,
            (_, b"TPE1") => Self::Artist,
            (_, b"TALB") => Self::Album,
            (_, b"TYER" | b"TDRC") => Self::Year,
            (_, b"TCON") => Self::Genre,
            (_, b"TRCK") => Self::Track,
            (_, b"APIC") => Self::Picture,
            _ => return None,
        };
        Some(role)
    }
}

impl Version {
    fn id_len(self) -> usize {
        match self {
            Version::V22 => 3,
            Version::V23 | Version::V24 => 4,
        }
    }

    fn frame_header_len(self) -> usize {
        match self {
            Version::V22 => 6,
            Version::V23 | Version::V24 => 10,
        }
    }

    fn frame_size(self, raw: &[u8]) -> usize {
        let size = match self {
            Version::V22 => u32::from_be_bytes([0, raw[0], raw[1], raw[2]]),
            Version::V23 => u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]),
            Version::V24 => super::decode_syncsafe([raw[0], raw[1], raw[2], raw[3]]),
        };
        size as usize
    }
}

#[derive(Debug, Copy, Clone)]
pub(super) struct Frame<'a> {
    pub id: &'a [u8],
    pub payload: &'a [u8],
}

/// Walks the frames of a tag body.
///
/// Iteration ends at padding, at a short or malformed frame header, at a
/// zero-sized frame, or at a frame whose declared size overruns `data`.
/// It never yields a partial frame.
pub(super) struct Frames<'a> {
    data: &'a [u8],
    offset: usize,
    version: Version,
}

impl<'a> Frames<'a> {
    /// `data` must already be cut to the declared tag end.
    pub(super) fn new(data: &'a [u8], start: usize, version: Version) -> Self {
        Self {
            data,
            offset: start,
            version,
        }
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Frame<'a>> {
        let rest = self.data.get(self.offset..)?;
        let header_len = self.version.frame_header_len();
        if rest.len() < header_len {
            return None;
        }

        let id_len = self.version.id_len();
        let id = &rest[..id_len];
        if id[0] == 0 {
            // Padding.
            return None;
        }

        let size = self.version.frame_size(&rest[id_len..header_len]);
        if size == 0 || size > rest.len() - header_len {
            return None;
        }

        let payload = &rest[header_len..header_len + size];
        self.offset += header_len + size;
        Some(Frame { id, payload })
    }
}
