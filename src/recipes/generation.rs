//! Image, video and sample generation recipes.

use super::RecipeContext;
use crate::images::{ImageRequest, DEFAULT_IMAGE_SIZE};
use crate::samples::{self, GENERATION_PAUSE};
use crate::video::{PollOptions, VideoRequest};
use crate::{Error, Result};

const IMAGE_PROMPT: &str = "A cute orange cat wearing a tiny astronaut helmet, floating among \
    stars, digital illustration, soft lighting";

const VIDEO_PROMPT: &str = "A paper boat drifting down a rain-filled street gutter, cinematic \
    close-up, shallow depth of field";

pub(super) async fn image_generation(ctx: &mut RecipeContext<'_>) -> Result<()> {
    writeln!(ctx.out, "Prompt: {IMAGE_PROMPT}")?;
    let image = ctx
        .client
        .generate_image(ImageRequest::new(IMAGE_PROMPT).size(DEFAULT_IMAGE_SIZE))
        .await?;
    let url = image
        .first_url()
        .ok_or_else(|| Error::runtime("No image URL in response"))?;
    writeln!(ctx.out, "Image URL: {url}")?;
    Ok(())
}

pub(super) async fn video_generation(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let mut request = VideoRequest::new(VIDEO_PROMPT);
    if let Some(frame) = ctx.input().map(str::to_string) {
        writeln!(ctx.out, "First frame: {frame}")?;
        request = request.image_url(frame);
    }
    writeln!(ctx.out, "Prompt: {VIDEO_PROMPT}")?;

    let task = ctx.client.submit_video(request).await?;
    writeln!(ctx.out, "Task {} submitted; waiting for the result...", task.id)?;
    ctx.out.flush()?;

    let done = ctx
        .client
        .wait_for_video(&task.id, PollOptions::default())
        .await?;
    for result in &done.video_result {
        writeln!(ctx.out, "Video URL: {}", result.url)?;
        if let Some(cover) = &result.cover_image_url {
            writeln!(ctx.out, "Cover: {cover}")?;
        }
    }
    Ok(())
}

pub(super) async fn generate_samples(ctx: &mut RecipeContext<'_>) -> Result<()> {
    writeln!(ctx.out, "Saving samples to {}", ctx.assets.dir().display())?;
    let out = &mut *ctx.out;
    let outcomes = samples::generate_samples(ctx.client, &ctx.assets, GENERATION_PAUSE, |o| {
        let _ = match &o.result {
            Ok(path) => writeln!(out, "  ok      {} -> {}", o.file, path.display()),
            Err(e) => writeln!(out, "  failed  {}: {e}", o.file),
        };
    })
    .await?;
    let ok = outcomes.iter().filter(|o| o.is_ok()).count();
    writeln!(ctx.out, "{ok}/{} samples generated", outcomes.len())?;
    Ok(())
}
