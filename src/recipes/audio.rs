//! Speech-to-text recipes. Both need `-u <audio file>`.

use super::{echo, RecipeContext};
use crate::multimodal::audio_file;
use crate::pipeline::collect_stream;
use crate::stt::TranscriptionRequest;
use crate::{Error, ErrorContext, Result};

fn request(ctx: &RecipeContext<'_>) -> Result<TranscriptionRequest> {
    let path = ctx.input().ok_or_else(|| {
        Error::validation_with_context(
            "transcription needs an audio file: run it with -u <file.wav|file.mp3>",
            ErrorContext::new().with_field_path("input"),
        )
    })?;
    Ok(TranscriptionRequest::new(audio_file(path)?))
}

pub(super) async fn transcription(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let req = request(ctx)?;
    writeln!(ctx.out, "File: {} ({} bytes)", req.audio.file_name, req.audio.bytes.len())?;
    let result = ctx.client.transcribe(&req).await?;
    writeln!(ctx.out, "Transcript: {}", result.text)?;
    Ok(())
}

pub(super) async fn streaming_transcription(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let req = request(ctx)?;
    writeln!(ctx.out, "File: {}", req.audio.file_name)?;
    let events = ctx.client.transcribe_stream(&req).await?;
    write!(ctx.out, "Transcript: ")?;
    let resp = collect_stream(events, echo(ctx.out, false)).await?;
    writeln!(ctx.out)?;
    if resp.content.is_empty() {
        writeln!(ctx.out, "(no speech recognised)")?;
    }
    Ok(())
}
