//! Identity codec (no compression).
//!
//! Used when `compression_level` is 0 and as the fallback when the
//! configured codec fails on save.

use super::traits::{CodecError, CompressionCodec};

/// Identity codec - text bytes stored as-is.
///
/// # Example
///
/// ```
/// use vellum_storage::codec::{CompressionCodec, IdentityCodec};
///
/// let codec = IdentityCodec;
/// let bytes = codec.compress("hello world").unwrap();
/// assert_eq!(bytes, b"hello world");
/// assert_eq!(codec.decompress(&bytes).unwrap(), "hello world");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl CompressionCodec for IdentityCodec {
    fn compress(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        Ok(text.as_bytes().to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<String, CodecError> {
        String::from_utf8(data.to_vec()).map_err(|e| CodecError::DecompressError(e.to_string()))
    }

    fn codec_id(&self) -> &str {
        "identity"
    }
}
