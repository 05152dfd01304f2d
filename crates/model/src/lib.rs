//! Shared contract between the Ames trainer and the prediction service.
//!
//! The trainer and the server must encode a record the same way twice: once
//! over the training CSV, once per prediction request. Everything that both
//! sides depend on lives here:
//!
//! - `schema`: the canonical ordered 14-slot feature schema
//! - `encode`: ordinal quality and neighborhood encoding, request validation
//! - `forest`: random-forest representation and inference
//! - `artifact`: the persisted bundle handed from trainer to server

pub mod artifact;
pub mod encode;
pub mod forest;
pub mod schema;

pub use artifact::{Artifact, ArtifactError, ARTIFACT_VERSION};
pub use encode::{
    encode_ordinal, EncodeError, NeighborhoodVocab, RecordEncoder, UNKNOWN_NEIGHBORHOOD,
};
pub use forest::{Node, RandomForestModel, Tree};
pub use schema::{FeatureKind, FeatureSlot, FEATURE_COUNT, FEATURE_SLOTS, TARGET_COLUMN};

/// Crate version string for diagnostics
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
