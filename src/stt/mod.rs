//! Speech-to-text through `POST audio/transcriptions`.

mod client;
mod types;

pub use types::{Transcription, TranscriptionRequest};
