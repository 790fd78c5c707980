//! STT (Speech-to-Text) types.

use crate::multimodal::AudioFile;
use serde::{Deserialize, Serialize};

/// Transcription result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Multipart transcription request.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio: AudioFile,
    /// Falls back to the configured ASR model when unset.
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub temperature: Option<f32>,
}

impl TranscriptionRequest {
    pub fn new(audio: AudioFile) -> Self {
        Self {
            audio,
            model: None,
            prompt: None,
            temperature: None,
        }
    }

    /// Context text that helps the recognizer (names, jargon, previous sentence).
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}
