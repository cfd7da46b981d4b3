//! Compression codec abstraction.
//!
//! Every payload the store writes goes through a [`CompressionCodec`]. The
//! codec id is recorded next to the payload so records can be decoded with
//! [`codec_by_id`] regardless of the codec the store currently writes with.
//!
//! # Known Codecs
//!
//! - `"identity"`: no compression
//! - `"zstd"`: Zstandard at a configurable level

mod identity;
mod traits;
mod zstd_codec;

pub use identity::IdentityCodec;
pub use traits::{CodecError, CompressionCodec};
pub use zstd_codec::{ZstdCodec, DEFAULT_ZSTD_LEVEL};

/// Get a codec by its identifier.
///
/// Returns the codec if recognized, or an error for unknown codec IDs.
pub fn codec_by_id(codec_id: &str) -> Result<Box<dyn CompressionCodec>, CodecError> {
    match codec_id {
        "identity" => Ok(Box::new(IdentityCodec)),
        "zstd" => Ok(Box::new(ZstdCodec::default())),
        _ => Err(CodecError::UnknownCodec(codec_id.to_string())),
    }
}

/// Codec for a configured compression level; 0 disables compression.
pub fn codec_for_level(level: i32) -> Box<dyn CompressionCodec> {
    if level == 0 {
        Box::new(IdentityCodec)
    } else {
        Box::new(ZstdCodec::new(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_known_codecs() {
        assert_eq!(codec_by_id("identity").unwrap().codec_id(), "identity");
        assert_eq!(codec_by_id("zstd").unwrap().codec_id(), "zstd");
    }

    #[test]
    fn test_get_unknown_codec() {
        let result = codec_by_id("unknown");
        assert!(matches!(result, Err(CodecError::UnknownCodec(_))));
    }

    #[test]
    fn test_codec_for_level() {
        assert_eq!(codec_for_level(0).codec_id(), "identity");
        assert_eq!(codec_for_level(5).codec_id(), "zstd");
    }
}
