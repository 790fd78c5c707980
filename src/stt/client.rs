//! Transcription calls on [`GlmClient`].

use super::types::{Transcription, TranscriptionRequest};
use crate::client::{ChatStream, GlmClient};
use crate::{Error, ErrorContext, Result};
use reqwest::multipart::{Form, Part};
use tracing::info;

impl GlmClient {
    fn transcription_form(&self, request: &TranscriptionRequest, stream: bool) -> Result<Form> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.settings.models.asr.clone());
        info!(model = %model, file = %request.audio.file_name, stream, "transcribing audio");

        let part = Part::bytes(request.audio.bytes.clone())
            .file_name(request.audio.file_name.clone())
            .mime_str(request.audio.mime)
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("Invalid mime: {}", e),
                    ErrorContext::new().with_source("stt"),
                )
            })?;
        let mut form = Form::new()
            .text("model", model)
            .text("stream", stream.to_string())
            .part("file", part);
        if let Some(prompt) = &request.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if let Some(temp) = request.temperature {
            form = form.text("temperature", temp.to_string());
        }
        Ok(form)
    }

    pub async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcription> {
        let form = self.transcription_form(request, false)?;
        let json = self
            .transport
            .post_multipart("audio/transcriptions", form)
            .await?;
        let text = json
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        Ok(Transcription {
            text,
            model: json.get("model").and_then(|v| v.as_str()).map(String::from),
        })
    }

    /// Streaming transcription; yields `TranscriptDelta` events then `Finished`.
    pub async fn transcribe_stream(&self, request: &TranscriptionRequest) -> Result<ChatStream> {
        let form = self.transcription_form(request, true)?;
        let bytes = self
            .transport
            .post_multipart_stream("audio/transcriptions", form)
            .await?;
        self.pipeline.process_stream(bytes).await
    }
}
