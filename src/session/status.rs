use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of one outbound call.
///
/// Success path: `Initiated → Ringing → InProgress → RecordingCaptured →
/// Completed`. `NoAnswer`, `Busy` and `Failed` end the call early. Terminal
/// states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    Initiated,
    Ringing,
    InProgress,
    RecordingCaptured,
    Completed,
    NoAnswer,
    Busy,
    Failed,
}

impl CallStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CallStatus::Completed | CallStatus::NoAnswer | CallStatus::Busy | CallStatus::Failed
        )
    }

    /// Position on the success path; `None` for the failure states.
    pub fn rank(self) -> Option<u8> {
        match self {
            CallStatus::Initiated => Some(0),
            CallStatus::Ringing => Some(1),
            CallStatus::InProgress => Some(2),
            CallStatus::RecordingCaptured => Some(3),
            CallStatus::Completed => Some(4),
            CallStatus::NoAnswer | CallStatus::Busy | CallStatus::Failed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallStatus::Initiated => "initiated",
            CallStatus::Ringing => "ringing",
            CallStatus::InProgress => "in-progress",
            CallStatus::RecordingCaptured => "recording-captured",
            CallStatus::Completed => "completed",
            CallStatus::NoAnswer => "no-answer",
            CallStatus::Busy => "busy",
            CallStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call status as reported by the telephony provider's status callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Initiated,
    Ringing,
    InProgress,
    Completed,
    Busy,
    NoAnswer,
    Failed,
}

impl ProviderStatus {
    /// The session status this report moves towards
    pub fn target(self) -> CallStatus {
        match self {
            ProviderStatus::Initiated => CallStatus::Initiated,
            ProviderStatus::Ringing => CallStatus::Ringing,
            ProviderStatus::InProgress => CallStatus::InProgress,
            ProviderStatus::Completed => CallStatus::Completed,
            ProviderStatus::Busy => CallStatus::Busy,
            ProviderStatus::NoAnswer => CallStatus::NoAnswer,
            ProviderStatus::Failed => CallStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized provider call status: {0:?}")]
pub struct UnknownProviderStatus(pub String);

impl FromStr for ProviderStatus {
    type Err = UnknownProviderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" | "initiated" => Ok(ProviderStatus::Initiated),
            "ringing" => Ok(ProviderStatus::Ringing),
            "in-progress" | "answered" => Ok(ProviderStatus::InProgress),
            "completed" => Ok(ProviderStatus::Completed),
            "busy" => Ok(ProviderStatus::Busy),
            "no-answer" => Ok(ProviderStatus::NoAnswer),
            "failed" | "canceled" => Ok(ProviderStatus::Failed),
            _ => Err(UnknownProviderStatus(s.to_string())),
        }
    }
}
