//! Persisted trainer output
//!
//! A single JSON document bundles the fitted forest, the canonical ordered
//! feature-name list, and the complete neighborhood vocabulary used at
//! training time. The vocabulary travels with the model so the server can
//! never drift from the codes the trainer actually assigned.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::NeighborhoodVocab;
use crate::forest::RandomForestModel;
use crate::schema::{feature_labels, FEATURE_COUNT};

/// Artifact format version
pub const ARTIFACT_VERSION: u32 = 1;

/// Errors raised while loading, saving, or validating an artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("artifact validation failed: {0}")]
    Validation(String),
}

/// The bundle handed from the trainer to the prediction service.
///
/// Created once at the end of a training run and read-only for the server's
/// process lifetime. There is no schema migration; a version bump means
/// retraining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub version: u32,
    pub feature_names: Vec<String>,
    pub neighborhoods: NeighborhoodVocab,
    pub model: RandomForestModel,
}

impl Artifact {
    /// Bundle a freshly trained model with the canonical feature names.
    pub fn new(model: RandomForestModel, neighborhoods: NeighborhoodVocab) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            feature_names: feature_labels(),
            neighborhoods,
            model,
        }
    }

    /// Check the artifact against the compiled schema.
    ///
    /// A feature-name list that differs from the canonical order would
    /// silently misalign every prediction, so order is checked exactly and
    /// a mismatch refuses to load.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ArtifactError::Validation(format!(
                "unsupported artifact version: {}",
                self.version
            )));
        }

        let expected = feature_labels();
        if self.feature_names != expected {
            return Err(ArtifactError::Validation(format!(
                "feature names do not match the canonical order: expected {:?}, found {:?}",
                expected, self.feature_names
            )));
        }

        if self.neighborhoods.is_empty() {
            return Err(ArtifactError::Validation(
                "neighborhood vocabulary is empty".to_string(),
            ));
        }

        self.model
            .validate(FEATURE_COUNT)
            .map_err(|err| ArtifactError::Validation(err.to_string()))?;

        Ok(())
    }

    /// Serialize to the on-disk JSON representation.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Blake3 hash of the serialized artifact, hex-encoded.
    pub fn hash_hex(&self) -> Result<String, ArtifactError> {
        let json = self.to_json()?;
        Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
    }

    /// Write the artifact to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load and validate an artifact from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let json = fs::read_to_string(path)?;
        let artifact: Artifact = serde_json::from_str(&json)?;
        artifact.validate()?;
        Ok(artifact)
    }
}
