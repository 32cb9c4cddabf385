//! StageEvent — A stage occurrence with metadata
//!
//! Wraps a Stage with timing, payload, and tags.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A stage event with full metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    /// The canonical stage
    pub stage: Stage,

    /// Timestamp in milliseconds on the session clock
    pub timestamp_ms: f64,

    /// Additional payload data
    #[serde(default)]
    pub payload: StagePayload,

    /// Custom tags for filtering/routing
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StageEvent {
    /// Create a new stage event
    pub fn new(stage: Stage, timestamp_ms: f64) -> Self {
        Self {
            stage,
            timestamp_ms,
            payload: StagePayload::default(),
            tags: Vec::new(),
        }
    }

    /// Create with payload
    pub fn with_payload(stage: Stage, timestamp_ms: f64, payload: StagePayload) -> Self {
        Self {
            stage,
            timestamp_ms,
            payload,
            tags: Vec::new(),
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get stage type name
    pub fn type_name(&self) -> &'static str {
        self.stage.type_name()
    }
}

/// Additional payload data for a stage event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagePayload {
    /// Round counter within the session (0-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_index: Option<u32>,

    /// Spin within the round (0-2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin_index: Option<u8>,

    /// Streak length at the time of the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_count: Option<u32>,

    /// Arbitrary JSON for engine-specific data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl StagePayload {
    /// Create empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set round index
    pub fn round(mut self, round_index: u32) -> Self {
        self.round_index = Some(round_index);
        self
    }

    /// Builder: set spin index
    pub fn spin(mut self, spin_index: u8) -> Self {
        self.spin_index = Some(spin_index);
        self
    }

    /// Builder: set streak length
    pub fn continue_count(mut self, count: u32) -> Self {
        self.continue_count = Some(count);
        self
    }

    /// Builder: set custom data
    pub fn custom(mut self, data: serde_json::Value) -> Self {
        self.custom = Some(data);
        self
    }
}
