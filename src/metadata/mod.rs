//! Model metadata
//!
//! Two storage schemas exist: the legacy one keeps each threshold as a raw
//! `f32` blob, the current one keeps a single JSON blob under `metadata`.
//! [`StoredMetadata::probe`] tells them apart and [`resolve_metadata`]
//! turns either into the same [`AnomalyMetadata`].

mod ir_format;
mod record;
mod resolve;
mod schema;


pub use ir_format::{metadata_in_ir_format, MODELAPI_LABELS, MODEL_TYPE};
pub use record::{AnomalyMetadata, CurrentMetadataBlob};
pub use resolve::resolve_metadata;
pub use schema::{LegacyBlobs, LegacyReason, StoredMetadata, LEGACY_KEYS};
