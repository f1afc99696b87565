//! Application state management

use crate::artifacts::load_artifacts;
use crate::error::Result;
use crate::inference::InferenceEngine;
use crate::schema::UiMetadata;

use super::ServerConfig;

/// Application state shared across handlers. Built once at startup and
/// never mutated afterwards.
pub struct AppState {
    pub config: ServerConfig,
    pub engine: InferenceEngine,
    pub metadata: UiMetadata,
}

impl AppState {
    pub fn new(config: ServerConfig, engine: InferenceEngine, metadata: UiMetadata) -> Self {
        Self {
            config,
            engine,
            metadata,
        }
    }

    /// Load artifacts from the configured paths. Fails only when no feature
    /// schema is available.
    pub fn load(config: ServerConfig) -> Result<Self> {
        let artifacts = load_artifacts(&config.artifacts)?;
        let engine = InferenceEngine::from_artifacts(&artifacts);
        Ok(Self::new(config, engine, artifacts.metadata))
    }
}
