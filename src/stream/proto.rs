use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";
pub const LOGS_SUBSCRIBE_METHOD: &str = "logsSubscribe";
pub const SUBSCRIBE_REQUEST_ID: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogsFilter {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "allWithVotes")]
    AllWithVotes,
    #[serde(untagged)]
    Mentions { mentions: Vec<String> },
}

impl Default for LogsFilter {
    fn default() -> Self {
        Self::All
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    #[default]
    Processed,
    Confirmed,
    Finalized,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitmentMsg {
    pub commitment: CommitmentLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscribeRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: (LogsFilter, CommitmentMsg),
}

impl SubscribeRequest {
    pub fn logs(filter: LogsFilter, commitment: CommitmentLevel) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: SUBSCRIBE_REQUEST_ID,
            method: LOGS_SUBSCRIBE_METHOD.to_string(),
            params: (filter, CommitmentMsg { commitment }),
        }
    }

    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogsNotification {
    pub params: LogsParamsMsg,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogsParamsMsg {
    #[serde(default)]
    pub subscription: Option<u64>,
    pub result: LogsResultMsg,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogsResultMsg {
    #[serde(default)]
    pub context: Option<SlotContextMsg>,
    pub value: LogsValueMsg,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SlotContextMsg {
    pub slot: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogsValueMsg {
    pub logs: Vec<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

impl LogsNotification {
    pub fn log_lines(&self) -> &[String] {
        &self.params.result.value.logs
    }
}

/// Per-frame parse failures. Both kinds are recoverable: the session reports
/// a diagnostic and keeps reading.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    MalformedFrame(serde_json::Error),

    #[error("frame lacks the logs notification shape: {0}")]
    ShapeMismatch(serde_json::Error),
}

impl FrameError {
    /// User-visible diagnostic line written to the console and the journal.
    pub fn diagnostic(&self) -> &'static str {
        match self {
            Self::MalformedFrame(_) => "Invalid JSON received.",
            Self::ShapeMismatch(_) => "Missing keys in received data.",
        }
    }
}

/// Decodes one text frame into a logs notification.
///
/// Decode failures are tagged: text that is not JSON at all is a
/// `MalformedFrame`, valid JSON without the nested
/// `params.result.value.logs` path is a `ShapeMismatch`.
pub fn parse_notification(text: &str) -> Result<LogsNotification, FrameError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(FrameError::MalformedFrame)?;
    serde_json::from_value(value).map_err(FrameError::ShapeMismatch)
}
