use serde::{Deserialize, Serialize};

use crate::types::Turn;

/// One generated alternative.
///
/// A candidate stopped by a safety filter or a token limit carries a
/// `finishReason` and no content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The turn the model produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Turn>,

    /// Why generation stopped, e.g. `STOP` or `SAFETY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Error object carried in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Human-readable error message.
    #[serde(default)]
    pub message: String,

    /// Numeric code, when the endpoint reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    /// Status string, when the endpoint reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body returned by the assistant endpoint.
///
/// Both fields are optional on the wire; which one is present decides how
/// the chat controller reacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated alternatives; the first one is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,

    /// Error reported in place of candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl GenerateResponse {
    /// Why the first candidate stopped, if the endpoint said.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .as_ref()
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.finish_reason.as_deref())
    }

    /// Consume the response and take the first candidate's turn.  A
    /// candidate without content, or whose content has no parts, yields
    /// nothing.
    pub fn into_first_turn(self) -> Option<Turn> {
        self.candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .filter(|turn| !turn.parts.is_empty())
    }

    /// The error message, if the body carried an error object.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|error| error.message.as_str())
    }
}
