//! Detection of the on-disk metadata schema.

use tracing::{info, warn};

use super::record::CurrentMetadataBlob;
use crate::model::{ModelArtifact, KEY_METADATA};
use crate::{Error, Result};

/// Keys of the per-field legacy blobs.
pub const LEGACY_KEYS: [&str; 4] = ["image_threshold", "pixel_threshold", "min", "max"];

/// Why an artifact was read through the legacy schema.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyReason {
    /// There is no `metadata` blob.
    MissingKey,
    /// A `metadata` blob exists but is not valid current-schema JSON.
    Malformed(String),
}

/// Legacy storage: one raw little-endian `f32` buffer per field.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyBlobs {
    pub image_threshold: Vec<f32>,
    pub pixel_threshold: Vec<f32>,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

fn decode_f32_blob(key: &str, bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(Error::InvalidBlob {
            key: key.to_string(),
            message: format!("expected a non-empty multiple of 4 bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

impl LegacyBlobs {
    pub fn read(artifact: &ModelArtifact) -> Result<Self> {
        let [image, pixel, min, max] = LEGACY_KEYS;
        Ok(Self {
            image_threshold: decode_f32_blob(image, artifact.get_data(image)?)?,
            pixel_threshold: decode_f32_blob(pixel, artifact.get_data(pixel)?)?,
            min: decode_f32_blob(min, artifact.get_data(min)?)?,
            max: decode_f32_blob(max, artifact.get_data(max)?)?,
        })
    }

    /// Scalars `(image_threshold, pixel_threshold, min, max)`.
    ///
    /// Buffers hold a single value; the first element is used.
    pub fn scalars(&self) -> (f32, f32, f32, f32) {
        let first = |v: &[f32]| v.first().copied().unwrap_or_default();
        (
            first(&self.image_threshold),
            first(&self.pixel_threshold),
            first(&self.min),
            first(&self.max),
        )
    }
}

/// Metadata as found in an artifact, tagged by schema version.
#[derive(Debug, Clone)]
pub enum StoredMetadata {
    /// Single JSON blob under `metadata`.
    Current(CurrentMetadataBlob),
    /// Per-field raw blobs.
    Legacy { blobs: LegacyBlobs, reason: LegacyReason },
}

impl StoredMetadata {
    /// Determine which schema `artifact` uses and read it.
    ///
    /// A missing `metadata` key and an undecodable one both lead to the
    /// legacy schema, but they are reported differently: the second is
    /// logged as a warning since it can hide a corrupted blob. When the
    /// legacy blobs are absent too, the decode error is returned.
    pub fn probe(artifact: &ModelArtifact) -> Result<Self> {
        if !artifact.has_data(KEY_METADATA) {
            let blobs = LegacyBlobs::read(artifact)?;
            info!("Metadata loaded from legacy per-field blobs");
            return Ok(StoredMetadata::Legacy {
                blobs,
                reason: LegacyReason::MissingKey,
            });
        }

        let bytes = artifact.get_data(KEY_METADATA)?;
        match serde_json::from_slice::<CurrentMetadataBlob>(bytes) {
            Ok(blob) => {
                info!("Metadata loaded from single JSON blob");
                Ok(StoredMetadata::Current(blob))
            }
            Err(decode_err) => {
                warn!(error = %decode_err, "Malformed metadata blob, falling back to legacy per-field blobs");
                let blobs = LegacyBlobs::read(artifact).map_err(|legacy_err| Error::InvalidBlob {
                    key: KEY_METADATA.to_string(),
                    message: format!("{decode_err}; legacy fallback failed: {legacy_err}"),
                })?;
                Ok(StoredMetadata::Legacy {
                    blobs,
                    reason: LegacyReason::Malformed(decode_err.to_string()),
                })
            }
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredMetadata::Legacy { .. })
    }
}
