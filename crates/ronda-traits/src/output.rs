//! Standardized result envelope of one agent invocation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, RondaError, SignalPayload, agent::AgentIdentity};

/// Metadata key holding the producing agent's name.
pub const AGENT_NAME_KEY: &str = "agent_name";

/// Metadata key holding the producing agent's role.
pub const AGENT_ROLE_KEY: &str = "agent_role";

/// Signal payload, confidence, rationale and diagnostics of one invocation.
///
/// An output is empty when it carries no payload or a payload with zero
/// rows; see [`Output::is_empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    signals: Option<SignalPayload>,
    score: Option<f64>,
    rationale: String,
    metadata: BTreeMap<String, Value>,
}

impl Output {
    /// Creates an output carrying `signals`.
    #[must_use]
    pub fn new(signals: impl Into<SignalPayload>) -> Self {
        Self {
            signals: Some(signals.into()),
            ..Self::default()
        }
    }

    /// Creates an output with no payload.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attaches a confidence score, which must lie in `[-1, 1]`.
    pub fn with_score(mut self, score: f64) -> Result<Self> {
        if !(-1.0..=1.0).contains(&score) {
            return Err(RondaError::InvalidData(format!(
                "Confidence score must be within [-1, 1], got {score}"
            )));
        }
        self.score = Some(score);
        Ok(self)
    }

    /// Attaches a human-readable rationale.
    #[must_use]
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The signal payload, if any.
    #[must_use]
    pub const fn signals(&self) -> Option<&SignalPayload> {
        self.signals.as_ref()
    }

    /// Consumes the output and returns its payload.
    #[must_use]
    pub fn into_signals(self) -> Option<SignalPayload> {
        self.signals
    }

    /// The confidence score, if any.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        self.score
    }

    /// The rationale; may be empty.
    #[must_use]
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Diagnostic metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Whether the output carries no payload or a payload with zero rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signals.as_ref().is_none_or(SignalPayload::is_empty)
    }

    /// Records the producer's identity without overwriting existing entries.
    pub fn stamp_identity(&mut self, identity: &AgentIdentity) {
        self.metadata
            .entry(AGENT_NAME_KEY.to_string())
            .or_insert_with(|| Value::String(identity.name.clone()));
        self.metadata
            .entry(AGENT_ROLE_KEY.to_string())
            .or_insert_with(|| Value::String(identity.role.clone()));
    }
}
