//! Video generation: submit a task, then poll `async-result/{id}`.
//!
//! Generation is asynchronous on the server; polling here follows that
//! contract at a fixed interval and is not a retry policy.

use crate::client::GlmClient;
use crate::multimodal::MediaRef;
use crate::pipeline::PipelineError;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub prompt: String,
    /// First frame for image-to-video; a public URL or a local image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quality: String,
    pub with_audio: bool,
    pub size: String,
    pub fps: u32,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            prompt: prompt.into(),
            image_url: None,
            quality: "speed".to_string(),
            with_audio: false,
            size: "1920x1080".to_string(),
            fps: 30,
        }
    }

    pub fn image_url(mut self, image: impl Into<String>) -> Self {
        self.image_url = Some(image.into());
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_audio(mut self, on: bool) -> Self {
        self.with_audio = on;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Processing,
    Success,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoResult {
    pub url: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoTask {
    pub id: String,
    pub task_status: TaskStatus,
    #[serde(default)]
    pub video_result: Vec<VideoResult>,
}

impl VideoTask {
    pub fn is_done(&self) -> bool {
        self.task_status != TaskStatus::Processing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_polls: 60,
        }
    }
}

fn parse_task(value: serde_json::Value, fallback_id: Option<&str>) -> Result<VideoTask> {
    let mut value = value;
    if value.get("id").is_none() {
        if let (Some(obj), Some(id)) = (value.as_object_mut(), fallback_id) {
            obj.insert("id".into(), serde_json::Value::String(id.to_string()));
        }
    }
    if value.get("id").is_none() {
        return Err(PipelineError::missing_field("id")
            .with_hint("video submission did not return a task id")
            .into());
    }
    Ok(serde_json::from_value(value)?)
}

impl GlmClient {
    /// Submit a generation task. A local first-frame image is embedded as a data URL.
    pub async fn submit_video(&self, request: VideoRequest) -> Result<VideoTask> {
        if request.prompt.trim().is_empty() {
            return Err(Error::validation_with_context(
                "video prompt must not be empty",
                ErrorContext::new()
                    .with_field_path("prompt")
                    .with_source("video"),
            ));
        }
        let image_url = match request.image_url.as_deref() {
            Some(input) => Some(match MediaRef::parse(input) {
                MediaRef::LocalFile(path) => crate::multimodal::file_to_data_url(&path)?,
                _ => input.to_string(),
            }),
            None => None,
        };
        let body = VideoRequest {
            model: Some(
                request
                    .model
                    .clone()
                    .unwrap_or_else(|| self.settings.models.video_gen.clone()),
            ),
            image_url,
            ..request
        };
        info!(model = ?body.model, quality = %body.quality, "submitting video task");
        let value = self
            .transport
            .post_json("videos/generations", &serde_json::to_value(&body)?)
            .await?;
        parse_task(value, None)
    }

    pub async fn video_result(&self, id: &str) -> Result<VideoTask> {
        let value = self
            .transport
            .get_json(&format!("async-result/{id}"))
            .await?;
        parse_task(value, Some(id))
    }

    /// Poll until the task leaves `PROCESSING`. `FAIL` and running out of polls are errors.
    pub async fn wait_for_video(&self, id: &str, opts: PollOptions) -> Result<VideoTask> {
        for attempt in 1..=opts.max_polls.max(1) {
            let task = self.video_result(id).await?;
            debug!(task_id = %id, attempt, status = ?task.task_status, "polled video task");
            match task.task_status {
                TaskStatus::Success => return Ok(task),
                TaskStatus::Fail => {
                    return Err(Error::runtime_with_context(
                        "video generation failed",
                        ErrorContext::new()
                            .with_details(format!("task {id}"))
                            .with_source("video"),
                    ))
                }
                TaskStatus::Processing => {
                    if attempt < opts.max_polls {
                        tokio::time::sleep(opts.interval).await;
                    }
                }
            }
        }
        Err(Error::runtime_with_context(
            format!(
                "video task still processing after {} polls",
                opts.max_polls.max(1)
            ),
            ErrorContext::new()
                .with_details(format!("task {id}"))
                .with_source("video"),
        ))
    }
}
