use serde::{Deserialize, Serialize};

use crate::types::{Part, Turn};

/// The fixed instruction block sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInstruction {
    /// Instruction text, normally a single part.
    pub parts: Vec<Part>,
}

impl SystemInstruction {
    /// Create a system instruction holding a single text part.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::new(text)],
        }
    }
}

impl From<&str> for SystemInstruction {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SystemInstruction {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Body of the request posted to the assistant endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// The whole conversation at the time of the call.
    pub contents: Vec<Turn>,

    /// The static system instruction.
    pub system_instruction: SystemInstruction,
}

impl GenerateRequest {
    /// Create a new `GenerateRequest` from a conversation snapshot.
    pub fn new(contents: Vec<Turn>, system_instruction: SystemInstruction) -> Self {
        Self {
            contents,
            system_instruction,
        }
    }
}
