//! The step protocol spoken between stepchain and the model.
//!
//! Every model response is a single JSON object with a `step` discriminator
//! and three optional string fields. The same shape is appended back into
//! the transcript, so what the model said and what the model sees are
//! byte-for-byte the same serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ProtocolError;

// ─────────────────────────────── Step kinds ───────────────────────────────

/// Discriminator for a reasoning step.
///
/// `OBSERVE` is normally synthesized by the turn loop after a tool run, but
/// the wire format accepts it from the model too.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum StepKind {
    Start,
    Plan,
    Tool,
    Observe,
    Output,
}

// ─────────────────────────────── Step payload ───────────────────────────────

/// One step of the protocol, as sent and received on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl Step {
    /// Builds the observation record appended after a tool run.
    pub fn observe(tool: &str, content: &str) -> Self {
        Self {
            step: StepKind::Observe,
            content: Some(content.to_string()),
            tool: Some(tool.to_string()),
            input: None,
        }
    }

    /// Extracts the tool name and input from a `TOOL` step.
    ///
    /// The name must be present and non-empty; the input must be present.
    pub fn tool_invocation(&self) -> Result<(&str, &str), ProtocolError> {
        let tool = self
            .tool
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProtocolError::MissingField {
                step: self.step.to_string(),
                field: "tool".into(),
            })?;
        let input = self
            .input
            .as_deref()
            .ok_or_else(|| ProtocolError::MissingField {
                step: self.step.to_string(),
                field: "input".into(),
            })?;
        Ok((tool, input))
    }

    /// Content for display, empty when the model sent none.
    pub fn display_content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

// ─────────────────────────────── Wire helpers ───────────────────────────────

/// Parses a raw model response into a [`Step`].
pub fn parse_step(raw: &str) -> Result<Step, ProtocolError> {
    serde_json::from_str(raw.trim()).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// JSON schema for the structured-output request, constraining the model to
/// exactly one well-formed step per response.
pub fn step_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "step": {
                "type": "string",
                "enum": ["START", "PLAN", "TOOL", "OBSERVE", "OUTPUT"],
                "description": "The kind of reasoning step."
            },
            "content": {
                "type": ["string", "null"],
                "description": "Free text for this step."
            },
            "tool": {
                "type": ["string", "null"],
                "description": "Tool name, required for TOOL steps."
            },
            "input": {
                "type": ["string", "null"],
                "description": "Tool input, required for TOOL steps."
            }
        },
        "required": ["step", "content", "tool", "input"],
        "additionalProperties": false
    })
}

// ─────────────────────────────── Tests ───────────────────────────────
