use super::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target number in E.164 form (`+` followed by 10–15 digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize free-form input ("(415) 555-1234", "+44 20 7946 0958").
    ///
    /// Ten-digit numbers are assumed to be North American and get the `1`
    /// country code.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

        if !(10..=15).contains(&digits.len()) {
            return Err(ValidationError::InvalidPhoneNumber(input.to_string()));
        }

        if digits.len() == 10 {
            Ok(Self(format!("+1{}", digits)))
        } else {
            Ok(Self(format!("+{}", digits)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How synthesized speech should sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Provider voice name ("alice", "Polly.Joanna", ...)
    pub voice_name: String,

    /// BCP-47 language tag
    pub language: String,

    /// Speaking rate multiplier (1.0 = normal)
    pub speed: f32,

    /// Pitch offset in Hz (0.0 = normal)
    pub pitch: f32,

    /// Render the text as SSML instead of plain text
    pub ssml: bool,

    /// Insert breaks after sentence and clause punctuation
    pub pauses: bool,

    /// Emphasize security-related words
    pub emphasis: bool,

    /// Read digit runs one digit at a time
    pub spell_numbers: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_name: "alice".to_string(),
            language: "en-US".to_string(),
            speed: 1.0,
            pitch: 0.0,
            ssml: false,
            pauses: false,
            emphasis: false,
            spell_numbers: false,
        }
    }
}

impl VoiceConfig {
    /// Voice name for a preset ("male_en", "robotic", ...); unknown presets
    /// fall back to the default voice.
    pub fn voice_for_preset(preset: &str) -> &'static str {
        match preset {
            "male_en" => "man",
            "female_en" => "alice",
            "robotic" => "Polly.Matthew",
            "child" => "Polly.Justin",
            "elderly" => "Polly.Brian",
            "celebrity" => "Polly.Joanna",
            _ => "alice",
        }
    }

    pub fn speed_for_preset(preset: &str) -> f32 {
        match preset {
            "slow" => 0.8,
            "fast" => 1.2,
            _ => 1.0,
        }
    }

    pub fn pitch_for_preset(preset: &str) -> f32 {
        match preset {
            "low" => -5.0,
            "high" => 5.0,
            _ => 0.0,
        }
    }

    /// Build a config from preset names
    pub fn from_presets(voice: &str, language: &str, speed: &str, pitch: &str) -> Self {
        Self {
            voice_name: Self::voice_for_preset(voice).to_string(),
            language: language.to_string(),
            speed: Self::speed_for_preset(speed),
            pitch: Self::pitch_for_preset(pitch),
            ..Self::default()
        }
    }
}

/// What the callee hears. Only constructed through validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Pre-recorded audio, played from a URL the provider can fetch
    Audio { url: String },

    /// Text spoken by the provider's synthesizer
    Speech { text: String, voice: VoiceConfig },
}

/// Unvalidated payload as supplied by a caller
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadRequest {
    Audio {
        url: String,
    },
    Speech {
        text: String,
        #[serde(default)]
        voice: VoiceConfig,
    },
}

impl PayloadRequest {
    pub fn speech(text: impl Into<String>) -> Self {
        PayloadRequest::Speech {
            text: text.into(),
            voice: VoiceConfig::default(),
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        PayloadRequest::Audio { url: url.into() }
    }

    /// Check the payload against the speech length limit.
    pub fn validate(self, max_speech_len: usize) -> Result<Payload, ValidationError> {
        match self {
            PayloadRequest::Audio { url } => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(ValidationError::EmptyAudioReference);
                }
                Ok(Payload::Audio {
                    url: url.to_string(),
                })
            }
            PayloadRequest::Speech { text, voice } => {
                validate_speech_text(&text, max_speech_len)?;
                Ok(Payload::Speech { text, voice })
            }
        }
    }
}

fn validate_speech_text(text: &str, max_len: usize) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptySpeechText);
    }

    let len = text.chars().count();
    if len > max_len {
        return Err(ValidationError::SpeechTextTooLong { len, max: max_len });
    }

    // Markup characters are only allowed in a full SSML document
    if !text.trim_start().starts_with("<speak") {
        if let Some(c) = text.chars().find(|c| matches!(c, '<' | '>' | '&')) {
            return Err(ValidationError::UnsupportedCharacter(c));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_normalization() {
        assert_eq!(
            PhoneNumber::parse("(415) 555-1234").unwrap().as_str(),
            "+14155551234"
        );
        assert_eq!(
            PhoneNumber::parse("+14155551234").unwrap().as_str(),
            "+14155551234"
        );
        assert_eq!(
            PhoneNumber::parse("+44 20 7946 0958").unwrap().as_str(),
            "+442079460958"
        );
    }

    #[test]
    fn test_phone_number_length_bounds() {
        assert!(PhoneNumber::parse("555-1234").is_err());
        assert!(PhoneNumber::parse("415555123").is_err());
        assert!(PhoneNumber::parse("1234567890123456").is_err());
        assert!(PhoneNumber::parse("").is_err());
    }

    #[test]
    fn test_speech_validation() {
        assert!(PayloadRequest::speech("please say your PIN").validate(4000).is_ok());
        assert_eq!(
            PayloadRequest::speech("   ").validate(4000),
            Err(ValidationError::EmptySpeechText)
        );
        assert_eq!(
            PayloadRequest::speech("abcdef").validate(5),
            Err(ValidationError::SpeechTextTooLong { len: 6, max: 5 })
        );
        assert_eq!(
            PayloadRequest::speech("press 1 & 2").validate(4000),
            Err(ValidationError::UnsupportedCharacter('&'))
        );
        assert!(PayloadRequest::speech("<speak>hi <break time=\"1s\"/></speak>")
            .validate(4000)
            .is_ok());
    }

    #[test]
    fn test_audio_validation() {
        assert_eq!(
            PayloadRequest::audio("  ").validate(4000),
            Err(ValidationError::EmptyAudioReference)
        );
        assert_eq!(
            PayloadRequest::audio("https://cdn.example.com/a.wav").validate(4000),
            Ok(Payload::Audio {
                url: "https://cdn.example.com/a.wav".to_string()
            })
        );
    }

    #[test]
    fn test_voice_presets() {
        let voice = VoiceConfig::from_presets("robotic", "en-GB", "slow", "high");
        assert_eq!(voice.voice_name, "Polly.Matthew");
        assert_eq!(voice.language, "en-GB");
        assert_eq!(voice.speed, 0.8);
        assert_eq!(voice.pitch, 5.0);
        assert_eq!(VoiceConfig::voice_for_preset("pirate"), "alice");
    }

    #[test]
    fn test_payload_request_from_json() {
        let req: PayloadRequest =
            serde_json::from_str(r#"{"kind":"speech","text":"hello","voice":{"speed":1.2}}"#)
                .unwrap();
        match req.validate(4000).unwrap() {
            Payload::Speech { text, voice } => {
                assert_eq!(text, "hello");
                assert_eq!(voice.speed, 1.2);
                assert_eq!(voice.voice_name, "alice");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
