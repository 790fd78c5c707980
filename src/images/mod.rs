//! Image generation (`POST images/generations`).

use crate::client::GlmClient;
use crate::pipeline::PipelineError;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    /// Falls back to the configured image model when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub prompt: String,
    pub size: String,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            prompt: prompt.into(),
            size: DEFAULT_IMAGE_SIZE.to_string(),
        }
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ImageBody {
    #[serde(default)]
    data: Vec<ImageData>,
}

/// Generated image locations (short-lived, pre-signed URLs).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResponse {
    pub urls: Vec<String>,
}

impl ImageResponse {
    pub fn first_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    pub(crate) fn from_body(body: serde_json::Value) -> Result<Self> {
        let parsed: ImageBody = serde_json::from_value(body)?;
        let urls: Vec<String> = parsed.data.into_iter().filter_map(|d| d.url).collect();
        if urls.is_empty() {
            return Err(PipelineError::missing_field("data[0].url")
                .with_hint("the image response carried no URL; check the prompt for moderation hits")
                .into());
        }
        Ok(Self { urls })
    }
}

impl GlmClient {
    pub async fn generate_image(&self, request: ImageRequest) -> Result<ImageResponse> {
        if request.prompt.trim().is_empty() {
            return Err(Error::validation_with_context(
                "image prompt must not be empty",
                ErrorContext::new()
                    .with_field_path("prompt")
                    .with_source("images"),
            ));
        }
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.settings.models.image_gen.clone());
        info!(model = %model, size = %request.size, "generating image");
        let body = serde_json::json!({
            "model": model,
            "prompt": request.prompt,
            "size": request.size,
        });
        let value = self
            .transport
            .post_json("images/generations", &body)
            .await?;
        ImageResponse::from_body(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_urls_are_collected() {
        let resp = ImageResponse::from_body(json!({
            "created": 1,
            "data": [{"url": "https://cdn.example.com/a.png"}]
        }))
        .unwrap();
        assert_eq!(resp.first_url(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn response_without_url_is_a_missing_field() {
        let err = ImageResponse::from_body(json!({"data": []})).unwrap_err();
        assert!(matches!(
            err,
            Error::Pipeline(PipelineError::MissingField { .. })
        ));
        assert!(err.to_string().contains("data[0].url"));
    }
}
