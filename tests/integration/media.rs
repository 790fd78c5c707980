//! Image generation, video tasks and transcription

use crate::mock_server::MockServerFixture;
use glm_cookbook::images::ImageRequest;
use glm_cookbook::multimodal::audio_file;
use glm_cookbook::pipeline::collect_stream;
use glm_cookbook::stt::TranscriptionRequest;
use glm_cookbook::video::{PollOptions, TaskStatus, VideoRequest};
use glm_cookbook::{Error, StreamingEvent};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

fn fast_polls(max_polls: u32) -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(5),
        max_polls,
    }
}

#[tokio::test]
async fn image_generation_returns_the_first_url() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mock = fixture
        .server
        .mock("POST", "/images/generations")
        .match_body(Matcher::PartialJson(json!({
            "model": "cogview-4-250304",
            "prompt": "a red kite",
            "size": "1024x1024"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"created":1,"data":[{"url":"https://cdn.example.com/kite.png"}]}"#)
        .create_async()
        .await;

    let image = fixture
        .client(dir.path())
        .generate_image(ImageRequest::new("a red kite"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(image.first_url(), Some("https://cdn.example.com/kite.png"));
}

#[tokio::test]
async fn video_task_is_polled_until_success() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _submit = fixture
        .mock_json_response(
            "POST",
            "/videos/generations",
            r#"{"id":"task-42","model":"cogvideox-3","task_status":"PROCESSING"}"#,
        )
        .await;
    let _done = fixture
        .mock_json_response(
            "GET",
            "/async-result/task-42",
            r#"{"task_status":"SUCCESS","video_result":[{"url":"https://cdn.example.com/v.mp4","cover_image_url":"https://cdn.example.com/v.jpg"}]}"#,
        )
        .await;

    let client = fixture.client(dir.path());
    let task = client
        .submit_video(VideoRequest::new("a paper boat"))
        .await
        .unwrap();
    assert_eq!(task.id, "task-42");
    assert_eq!(task.task_status, TaskStatus::Processing);

    let done = client.wait_for_video(&task.id, fast_polls(3)).await.unwrap();
    assert!(done.is_done());
    assert_eq!(done.id, "task-42");
    assert_eq!(done.video_result[0].url, "https://cdn.example.com/v.mp4");
    assert_eq!(
        done.video_result[0].cover_image_url.as_deref(),
        Some("https://cdn.example.com/v.jpg")
    );
}

#[tokio::test]
async fn failed_or_stuck_video_tasks_are_errors() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let _failed = fixture
        .mock_json_response("GET", "/async-result/bad", r#"{"task_status":"FAIL"}"#)
        .await;
    let stuck = fixture
        .server
        .mock("GET", "/async-result/slow")
        .with_status(200)
        .with_body(r#"{"task_status":"PROCESSING"}"#)
        .expect(2)
        .create_async()
        .await;

    let client = fixture.client(dir.path());
    let err = client.wait_for_video("bad", fast_polls(3)).await.unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));

    let err = client
        .wait_for_video("slow", fast_polls(2))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("after 2 polls"));
    stuck.assert_async().await;
}

#[tokio::test]
async fn transcription_uploads_multipart_audio() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("hello.wav");
    std::fs::write(&wav, b"RIFF\0\0\0\0WAVEfmt ").unwrap();

    let mock = fixture
        .server
        .mock("POST", "/audio/transcriptions")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("name=\"model\"".to_string()),
            Matcher::Regex("glm-asr-2512".to_string()),
            Matcher::Regex("filename=\"hello.wav\"".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"t1","model":"glm-asr-2512","text":"hello world"}"#)
        .create_async()
        .await;

    let request = TranscriptionRequest::new(audio_file(&wav).unwrap());
    let result = fixture
        .client(dir.path())
        .transcribe(&request)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.text, "hello world");
    assert_eq!(result.model.as_deref(), Some("glm-asr-2512"));
}

#[tokio::test]
async fn streaming_transcription_accumulates_deltas() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mp3 = dir.path().join("clip.mp3");
    std::fs::write(&mp3, b"ID3").unwrap();
    let _mock = fixture
        .mock_sse_stream(
            "/audio/transcriptions",
            &[
                r#"{"type":"transcript.text.delta","delta":"good "}"#,
                r#"{"type":"transcript.text.delta","delta":"morning"}"#,
                r#"{"type":"transcript.text.done","text":"good morning"}"#,
                "[DONE]",
            ],
        )
        .await;

    let request = TranscriptionRequest::new(audio_file(&mp3).unwrap());
    let events = fixture
        .client(dir.path())
        .transcribe_stream(&request)
        .await
        .unwrap();
    let mut deltas = Vec::new();
    let resp = collect_stream(events, |e| {
        if let StreamingEvent::TranscriptDelta { text } = e {
            deltas.push(text.clone());
        }
    })
    .await
    .unwrap();

    assert_eq!(deltas, vec!["good ", "morning"]);
    assert_eq!(resp.content, "good morning");
    assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
}

#[test]
fn unsupported_audio_formats_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let flac = dir.path().join("song.flac");
    std::fs::write(&flac, b"fLaC").unwrap();
    let err = audio_file(&flac).unwrap_err();
    assert!(matches!(err, Error::UnsupportedInput { .. }));
}
