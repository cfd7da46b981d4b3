//! On-disk record encoding
//!
//! A record is a MessagePack (`rmp-serde`, named fields) envelope:
//!
//! | Field | Content |
//! |-------|---------|
//! | `format_version` | [`RECORD_FORMAT_VERSION`] |
//! | `metadata` | [`VersionMetadata`], uncompressed so the index can be rebuilt cheaply |
//! | `is_snapshot` | snapshot flag |
//! | `codec_id` | codec that produced `payload` |
//! | `original_size` | payload length before compression |
//! | `payload` | compressed JSON of `{delta?, full_content?}` |

use serde::{Deserialize, Serialize};
use tracing::warn;

use vellum_core::{Error, Result, Version, VersionDelta, VersionMetadata};

use crate::codec::{codec_by_id, CompressionCodec, IdentityCodec};

/// Current record format
pub const RECORD_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delta: Option<VersionDelta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_content: Option<String>,
}

/// A version as persisted by a backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Record format version
    pub format_version: u32,
    /// Version metadata
    pub metadata: VersionMetadata,
    /// Whether the payload carries full content
    pub is_snapshot: bool,
    /// Codec used for `payload`
    pub codec_id: String,
    /// Payload size before compression
    pub original_size: usize,
    /// Compressed payload
    pub payload: Vec<u8>,
}

impl StoredRecord {
    /// Encode a version, compressing its payload with `codec`
    ///
    /// If the codec fails the payload is stored uncompressed.
    pub fn encode(version: &Version, codec: &dyn CompressionCodec) -> Result<Self> {
        let payload = Payload {
            delta: version.delta.clone(),
            full_content: version.full_content.clone(),
        };
        let text = serde_json::to_string(&payload)
            .map_err(|e| Error::storage(format!("serialize payload of {}: {}", version.id(), e)))?;

        let (codec_id, bytes) = match codec.compress(&text) {
            Ok(bytes) => (codec.codec_id().to_string(), bytes),
            Err(e) => {
                warn!(
                    version = %version.id(),
                    codec = codec.codec_id(),
                    error = %e,
                    "Compression failed, storing payload uncompressed"
                );
                let identity = IdentityCodec;
                (identity.codec_id().to_string(), identity.compress(&text)?)
            }
        };

        Ok(StoredRecord {
            format_version: RECORD_FORMAT_VERSION,
            metadata: version.metadata.clone(),
            is_snapshot: version.is_snapshot,
            codec_id,
            original_size: text.len(),
            payload: bytes,
        })
    }

    /// Serialize the envelope
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self)
            .map_err(|e| Error::storage(format!("encode record {}: {}", self.metadata.id, e)))
    }

    /// Deserialize an envelope
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let record: StoredRecord = rmp_serde::from_slice(bytes)
            .map_err(|e| Error::storage(format!("decode record: {}", e)))?;
        if record.format_version > RECORD_FORMAT_VERSION {
            return Err(Error::storage(format!(
                "record {} has format version {}, newest supported is {}",
                record.metadata.id, record.format_version, RECORD_FORMAT_VERSION
            )));
        }
        Ok(record)
    }

    /// Payload size after compression
    pub fn stored_size(&self) -> usize {
        self.payload.len()
    }

    /// Decompress the payload and rebuild the version
    pub fn into_version(self) -> Result<Version> {
        let codec = codec_by_id(&self.codec_id)?;
        let text = codec.decompress(&self.payload)?;
        let payload: Payload = serde_json::from_str(&text).map_err(|e| {
            Error::storage(format!("corrupt payload for {}: {}", self.metadata.id, e))
        })?;
        let version = Version {
            metadata: self.metadata,
            delta: payload.delta,
            full_content: payload.full_content,
            is_snapshot: self.is_snapshot,
        };
        if !version.is_well_formed() {
            return Err(Error::storage(format!(
                "record {} is neither a snapshot with content nor a delta with a parent",
                version.id()
            )));
        }
        Ok(version)
    }
}
