//! Payloads exchanged with the sync and execution endpoints.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::error::FrameError;

/// Language tag understood by the execution endpoint.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumVariantNames,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    TypeScript,
}

/// Body of `POST /run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub code: String,
    pub language: Language,
}

impl RunRequest {
    pub fn new(code: impl Into<String>, language: Language) -> Self {
        Self {
            code: code.into(),
            language,
        }
    }
}

/// A sync frame mirroring the editor contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUpdate {
    pub code: String,
}

/// Inbound frames may omit `code`; anything else in the object is ignored.
#[derive(Deserialize)]
struct InboundFrame {
    code: Option<String>,
}

impl CodeUpdate {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Serializes the update as a text frame.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Interprets an inbound text frame.
    ///
    /// Returns `Ok(Some(code))` when the frame is a JSON object carrying a
    /// string `code` field and `Ok(None)` when the object has no such field.
    /// Non-JSON payloads, non-object values and a non-string `code` are
    /// reported as [`FrameError::Malformed`].
    pub fn parse_frame(payload: &str) -> Result<Option<String>, FrameError> {
        let value = serde_json::from_str::<serde_json::Value>(payload)
            .map_err(|err| FrameError::malformed(err.to_string()))?;
        if !value.is_object() {
            return Err(FrameError::malformed("frame is not a JSON object"));
        }

        serde_json::from_value::<InboundFrame>(value)
            .map(|frame| frame.code)
            .map_err(|err| FrameError::malformed(err.to_string()))
    }
}
