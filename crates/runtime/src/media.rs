//! Upload content attached to a call.

use std::io::Read;

/// Content type used when the caller doesn't know better.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content uploaded alongside (or instead of) a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    bytes: Vec<u8>,
    content_type: String,
}

impl Media {
    /// Media from in-memory bytes.
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Buffer everything `reader` yields.
    pub fn from_reader(mut reader: impl Read, content_type: impl Into<String>) -> std::io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(bytes, content_type))
    }

    /// The raw content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared content type, or [`DEFAULT_CONTENT_TYPE`] when empty.
    pub fn content_type(&self) -> &str {
        if self.content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.content_type
        }
    }

    /// Content size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for zero-length content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader() {
        let media = Media::from_reader(&b"hello"[..], "").unwrap();
        assert_eq!(media.bytes(), b"hello");
        assert_eq!(media.len(), 5);
        assert_eq!(media.content_type(), DEFAULT_CONTENT_TYPE);
    }
}
