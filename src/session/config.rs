use serde::{Deserialize, Serialize};

/// Limits applied when a call session is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of characters in a speech payload
    /// Default: 4000
    pub max_speech_text_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_speech_text_length: 4000,
        }
    }
}
