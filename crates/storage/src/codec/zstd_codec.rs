//! Zstandard codec.

use super::traits::{CodecError, CompressionCodec};

/// Default zstd compression level
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// zstd compression at a fixed level.
///
/// Decompression does not depend on the level, so any `ZstdCodec` reads
/// any zstd record.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Create a codec compressing at `level`
    pub fn new(level: i32) -> Self {
        ZstdCodec { level }
    }

    /// Compression level
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        ZstdCodec::new(DEFAULT_ZSTD_LEVEL)
    }
}

impl CompressionCodec for ZstdCodec {
    fn compress(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        ::zstd::encode_all(text.as_bytes(), self.level)
            .map_err(|e| CodecError::CompressError(format!("zstd level {}: {}", self.level, e)))
    }

    fn decompress(&self, data: &[u8]) -> Result<String, CodecError> {
        let bytes =
            ::zstd::decode_all(data).map_err(|e| CodecError::DecompressError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CodecError::DecompressError(e.to_string()))
    }

    fn codec_id(&self) -> &str {
        "zstd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip() {
        let codec = ZstdCodec::default();
        let text = r#"{"items":["#.to_string() + &"\"abc\",".repeat(500) + "\"end\"]}";
        let bytes = codec.compress(&text).unwrap();
        assert!(bytes.len() < text.len());
        assert_eq!(codec.decompress(&bytes).unwrap(), text);
    }

    #[test]
    fn test_zstd_empty() {
        let codec = ZstdCodec::new(1);
        let bytes = codec.compress("").unwrap();
        assert_eq!(codec.decompress(&bytes).unwrap(), "");
    }

    #[test]
    fn test_zstd_rejects_garbage() {
        let result = ZstdCodec::default().decompress(b"definitely not zstd");
        assert!(matches!(result, Err(CodecError::DecompressError(_))));
    }

    #[test]
    fn test_level_does_not_affect_decoding() {
        let text = "x".repeat(1000);
        let bytes = ZstdCodec::new(19).compress(&text).unwrap();
        assert_eq!(ZstdCodec::new(1).decompress(&bytes).unwrap(), text);
    }
}
