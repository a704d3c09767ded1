//! Messages exchanged with the fare worker.

use serde::{Deserialize, Serialize};

use crate::pricing::{FareArgs, FareResult};

use super::DispatchError;

/// Outbound: `{ "id": ..., "args": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub id: String,
    pub args: FareArgs,
}

/// Inbound: `{ "id": ..., "result": {...} }` or `{ "id": ..., "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FareResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(id: String, result: FareResult) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: String, error: impl ToString) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.to_string()),
        }
    }

    /// An error field wins over a result field.
    pub fn into_outcome(self) -> Result<FareResult, DispatchError> {
        match (self.result, self.error) {
            (_, Some(message)) => Err(DispatchError::Rejected(message)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(DispatchError::MalformedReply(self.id)),
        }
    }
}
