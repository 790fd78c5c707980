//! Media references for vision, video and audio inputs.
//!
//! Images may be public URLs, data URLs or local files (embedded as base64
//! data URLs). Video understanding only accepts public `http(s)` URLs, and
//! that restriction is checked here, before any request is made.

use crate::types::message::ContentPart;
use crate::{Error, ErrorContext, Result};
use base64::Engine as _;
use std::path::{Path, PathBuf};
use url::Url;

/// Where a piece of media comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRef {
    Url(Url),
    DataUrl(String),
    LocalFile(PathBuf),
}

impl MediaRef {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with("data:") {
            return MediaRef::DataUrl(trimmed.to_string());
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                return MediaRef::Url(url);
            }
        }
        MediaRef::LocalFile(PathBuf::from(trimmed))
    }

    pub fn is_public_url(&self) -> bool {
        matches!(self, MediaRef::Url(_))
    }
}

/// Image content part for `input`: URLs pass through, local files are embedded.
pub fn image_part(input: &str) -> Result<ContentPart> {
    match MediaRef::parse(input) {
        MediaRef::Url(url) => Ok(ContentPart::image_url(url.to_string())),
        MediaRef::DataUrl(data) => Ok(ContentPart::image_url(data)),
        MediaRef::LocalFile(path) => Ok(ContentPart::image_url(file_to_data_url(&path)?)),
    }
}

/// Video content part; only public `http(s)` URLs are accepted.
pub fn video_part(input: &str) -> Result<ContentPart> {
    match MediaRef::parse(input) {
        MediaRef::Url(url) => Ok(ContentPart::video_url(url.to_string())),
        other => {
            let kind = match other {
                MediaRef::DataUrl(_) => "base64 data URL",
                _ => "local file",
            };
            Err(Error::unsupported_input_with_context(
                format!(
                    "video understanding only supports public http(s) URLs, got a {kind}; \
                     upload the video somewhere reachable and pass its URL with -u"
                ),
                ErrorContext::new()
                    .with_field_path("video_url")
                    .with_details(input.to_string())
                    .with_source("multimodal"),
            ))
        }
    }
}

/// Local audio file ready for a multipart upload.
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Read an audio file for transcription; `.wav` and `.mp3` only.
pub fn audio_file(path: impl AsRef<Path>) -> Result<AudioFile> {
    let path = path.as_ref();
    let mime = match guess_media_type(path) {
        Some(mt @ ("audio/wav" | "audio/mpeg")) => mt,
        _ => {
            return Err(Error::unsupported_input_with_context(
                "transcription accepts .wav and .mp3 files",
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("multimodal"),
            ))
        }
    };
    let bytes = read_existing(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio")
        .to_string();
    Ok(AudioFile {
        file_name,
        mime,
        bytes,
    })
}

/// `data:<mime>;base64,<payload>` for a local file.
pub fn file_to_data_url(path: &Path) -> Result<String> {
    let bytes = read_existing(path)?;
    let mime = guess_media_type(path).unwrap_or("application/octet-stream");
    let data = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{mime};base64,{data}"))
}

fn read_existing(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(Error::validation_with_context(
            format!("file not found: {}", path.display()),
            ErrorContext::new()
                .with_field_path(path.display().to_string())
                .with_source("multimodal"),
        ));
    }
    Ok(std::fs::read(path)?)
}

pub(crate) fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let mt = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        _ => return None,
    };
    Some(mt)
}
