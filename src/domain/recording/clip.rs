//! Encoded audio clip value object

/// MIME type of encoded answer clips
pub const CLIP_MIME: &str = "audio/flac";

/// File name the clip travels under in multipart uploads
pub const CLIP_FILE_NAME: &str = "answer.flac";

/// Value object holding one encoded answer recording, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    data: Vec<u8>,
    duration_ms: u64,
}

impl AudioClip {
    /// Create a clip from encoded FLAC bytes
    pub fn new(data: Vec<u8>, duration_ms: u64) -> Self {
        Self { data, duration_ms }
    }

    /// Get the encoded bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the encoded bytes
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Spoken length in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
