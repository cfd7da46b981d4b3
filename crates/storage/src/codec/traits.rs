//! Compression codec trait definitions.

/// Compression codec trait.
///
/// Every stored payload passes through the codec. `compress` and
/// `decompress` must be inverses.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync` so a store can be shared across threads.
///
/// # Codec Identity
///
/// Each codec has a unique identifier that is stored in every record.
/// Records are decoded with the codec named in the record, not with the
/// store's current codec, so a store can change codecs without rewriting.
pub trait CompressionCodec: Send + Sync {
    /// Compress text for storage.
    fn compress(&self, text: &str) -> Result<Vec<u8>, CodecError>;

    /// Decompress bytes back into the original text.
    fn decompress(&self, data: &[u8]) -> Result<String, CodecError>;

    /// Unique codec identifier.
    fn codec_id(&self) -> &str;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Compression failed.
    #[error("Compress error: {0}")]
    CompressError(String),

    /// Decompression failed (corrupt bytes, not UTF-8).
    #[error("Decompress error: {0}")]
    DecompressError(String),

    /// Unknown codec identifier.
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),
}

impl From<CodecError> for vellum_core::Error {
    fn from(e: CodecError) -> Self {
        vellum_core::Error::storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test that trait is object-safe
    fn _accepts_box_dyn_codec(_codec: Box<dyn CompressionCodec>) {}

    #[test]
    fn test_codec_error_is_storage_error() {
        let err: vellum_core::Error = CodecError::UnknownCodec("lz9".into()).into();
        assert!(err.is_storage());
    }
}
