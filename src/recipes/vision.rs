//! Image and video understanding recipes.

use super::{echo, RecipeContext};
use crate::multimodal::{image_part, video_part};
use crate::samples::{IMAGE_UNDERSTANDING, MULTI_IMAGE_1, MULTI_IMAGE_2, OBJECT_DETECTION};
use crate::structured::extract_json;
use crate::types::message::{ContentPart, Message};
use crate::{Error, ErrorContext, Result};
use serde::Deserialize;

/// Public clip used when no `-u` is given.
pub const DEFAULT_VIDEO_URL: &str =
    "https://interactive-examples.mdn.mozilla.net/media/cc0-videos/flower.mp4";

const DETECTION_PROMPT: &str = "Detect the distinct objects in this image. Answer with a JSON \
    array only, one element per object: {\"label\": string, \"bbox\": [x1, y1, x2, y2]} with \
    coordinates normalised to 0-1000.";

#[derive(Debug, Deserialize)]
struct Detection {
    label: String,
    #[serde(default)]
    bbox: Vec<f64>,
}

/// `-u` if given, otherwise the named sample (which must exist).
fn image_source(ctx: &RecipeContext<'_>, sample: &str) -> Result<String> {
    match ctx.input() {
        Some(input) => Ok(input.to_string()),
        None => Ok(ctx.assets.require(sample)?.display().to_string()),
    }
}

fn image_pair(ctx: &RecipeContext<'_>) -> Result<(String, String)> {
    let Some(input) = ctx.input() else {
        return Ok((
            ctx.assets.require(MULTI_IMAGE_1)?.display().to_string(),
            ctx.assets.require(MULTI_IMAGE_2)?.display().to_string(),
        ));
    };
    let refs: Vec<&str> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    match refs.as_slice() {
        [a, b] => Ok((a.to_string(), b.to_string())),
        _ => Err(Error::validation_with_context(
            "multi-image comparison needs two images: -u first,second",
            ErrorContext::new()
                .with_field_path("input")
                .with_details(input.to_string()),
        )),
    }
}

pub(super) async fn image_understanding(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let image = image_part(&image_source(ctx, IMAGE_UNDERSTANDING)?)?;
    let client = ctx.client;
    client
        .chat()
        .model(client.settings().models.vision.clone())
        .message(Message::user_parts(vec![
            image,
            ContentPart::text("Describe this image in detail: scene, objects, colours and mood."),
        ]))
        .stream_collect(echo(ctx.out, ctx.options.show_thinking))
        .await?;
    writeln!(ctx.out)?;
    Ok(())
}

pub(super) async fn multi_image(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let (first, second) = image_pair(ctx)?;
    let parts = vec![
        image_part(&first)?,
        image_part(&second)?,
        ContentPart::text(
            "Compare these two rooms: list the main similarities and differences in style, \
             furniture and lighting.",
        ),
    ];
    let client = ctx.client;
    client
        .chat()
        .model(client.settings().models.vision.clone())
        .message(Message::user_parts(parts))
        .stream_collect(echo(ctx.out, ctx.options.show_thinking))
        .await?;
    writeln!(ctx.out)?;
    Ok(())
}

pub(super) async fn object_detection(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let image = image_part(&image_source(ctx, OBJECT_DETECTION)?)?;
    let client = ctx.client;
    let resp = client
        .chat()
        .model(client.settings().models.vision.clone())
        .message(Message::user_parts(vec![
            image,
            ContentPart::text(DETECTION_PROMPT),
        ]))
        .temperature(0.1)
        .send()
        .await?;

    let value = extract_json(&resp.content)?;
    let list = match value.get("objects") {
        Some(objects) => objects.clone(),
        None => value,
    };
    let detections: Vec<Detection> = serde_json::from_value(list)?;
    writeln!(ctx.out, "Found {} objects:", detections.len())?;
    for d in &detections {
        if d.bbox.len() == 4 {
            writeln!(
                ctx.out,
                "  - {:<20} [{:.0}, {:.0}, {:.0}, {:.0}]",
                d.label, d.bbox[0], d.bbox[1], d.bbox[2], d.bbox[3]
            )?;
        } else {
            writeln!(ctx.out, "  - {}", d.label)?;
        }
    }
    Ok(())
}

pub(super) async fn video_understanding(ctx: &mut RecipeContext<'_>) -> Result<()> {
    let source = ctx.input().unwrap_or(DEFAULT_VIDEO_URL).to_string();
    let video = video_part(&source)?;
    writeln!(ctx.out, "Video: {source}")?;
    let client = ctx.client;
    client
        .chat()
        .model(client.settings().models.vision.clone())
        .message(Message::user_parts(vec![
            video,
            ContentPart::text("Summarise what happens in this video."),
        ]))
        .stream_collect(echo(ctx.out, ctx.options.show_thinking))
        .await?;
    writeln!(ctx.out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detections_accept_missing_bbox() {
        let list: Vec<Detection> = serde_json::from_value(serde_json::json!([
            {"label": "car", "bbox": [1, 2, 3, 4]},
            {"label": "sign"}
        ]))
        .unwrap();
        assert_eq!(list[0].bbox.len(), 4);
        assert!(list[1].bbox.is_empty());
    }
}
