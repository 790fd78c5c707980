//! Recipes end to end: output, sample assets and input checks

use crate::mock_server::MockServerFixture;
use glm_cookbook::recipes::{Recipe, RecipeContext, RecipeOptions};
use glm_cookbook::samples::IMAGE_UNDERSTANDING;
use glm_cookbook::{Error, GlmClient};

fn options(input: Option<&str>) -> RecipeOptions {
    RecipeOptions {
        input: input.map(String::from),
        show_thinking: false,
    }
}

async fn run(client: &GlmClient, recipe: Recipe, input: Option<&str>) -> (glm_cookbook::Result<()>, String) {
    let mut out = Vec::new();
    let result = {
        let mut ctx = RecipeContext::new(client, options(input), &mut out);
        recipe.run(&mut ctx).await
    };
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn vision_recipes_without_samples_report_missing_asset() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let guard = fixture.mock_never_called("/chat/completions").await;
    let client = fixture.client(dir.path());

    for recipe in [
        Recipe::ImageUnderstanding,
        Recipe::MultiImage,
        Recipe::ObjectDetection,
    ] {
        let (result, _) = run(&client, recipe, None).await;
        match result {
            Err(Error::MissingAsset { path, hint }) => {
                assert!(path.starts_with(dir.path()));
                assert!(hint.contains("samples"));
            }
            other => panic!("{recipe:?}: unexpected {other:?}"),
        }
    }
    guard.assert_async().await;
}

#[tokio::test]
async fn video_understanding_rejects_local_paths_before_sending() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let guard = fixture.mock_never_called("/chat/completions").await;
    let client = fixture.client(dir.path());

    for input in ["./clip.mp4", "/tmp/clip.mp4", "data:video/mp4;base64,AAAA"] {
        let (result, _) = run(&client, Recipe::VideoUnderstanding, Some(input)).await;
        let err = result.unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput { .. }), "{input}: {err:?}");
        assert!(err.to_string().contains("public"));
    }
    guard.assert_async().await;
}

#[tokio::test]
async fn image_understanding_streams_a_description_of_the_sample() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(IMAGE_UNDERSTANDING), [0xFF, 0xD8, 0xFF]).unwrap();
    let mock = fixture
        .server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::Regex("\"model\":\"glm-4.6v\"".to_string()),
            mockito::Matcher::Regex("data:image/jpeg;base64,".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(
            "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"A koi pond\"}}]}\n\n\
             data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\" at dawn.\"}}]}\n\n\
             data: [DONE]\n\n",
        )
        .create_async()
        .await;

    let client = fixture.client(dir.path());
    let (result, out) = run(&client, Recipe::ImageUnderstanding, None).await;
    result.unwrap();
    mock.assert_async().await;
    assert!(out.starts_with("=== 7. Image understanding ==="));
    assert!(out.contains("A koi pond at dawn."));
}

#[tokio::test]
async fn json_output_recipe_prints_the_extracted_object() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let body = serde_json::json!({
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {
                "role": "assistant",
                "content": "```json\n{\"people\": [\"Ada Lovelace\"], \"places\": [\"London\"], \"dates\": []}\n```"
            }
        }]
    });
    let _mock = fixture
        .mock_json_matching(
            "/chat/completions",
            r#""response_format":{"type":"json_object"}"#,
            &body.to_string(),
        )
        .await;

    let client = fixture.client(dir.path());
    let (result, out) = run(&client, Recipe::JsonOutput, None).await;
    result.unwrap();
    assert!(out.contains("\"people\": ["));
    assert!(out.contains("\"Ada Lovelace\""));
}

#[tokio::test]
async fn function_calling_recipe_runs_the_local_weather_tool() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let first = serde_json::json!({
        "choices": [{
            "index": 0,
            "finish_reason": "tool_calls",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "get_weather", "arguments": "{\"city\":\"Beijing\"}"}
                }]
            }
        }]
    });
    let second = serde_json::json!({
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {"role": "assistant", "content": "It is mild in Beijing."}
        }]
    });
    let ask = fixture
        .mock_json_response("POST", "/chat/completions", &first.to_string())
        .await;
    let answer = fixture
        .mock_json_matching("/chat/completions", r#""role":"tool""#, &second.to_string())
        .await;

    let client = fixture.client(dir.path());
    let (result, out) = run(&client, Recipe::FunctionCalling, None).await;
    result.unwrap();
    ask.assert_async().await;
    answer.assert_async().await;
    assert!(out.contains("Tool call: get_weather({\"city\":\"Beijing\"})"));
    assert!(out.contains("\"city\":\"Beijing\""));
    assert!(out.contains("It is mild in Beijing."));
}

#[tokio::test]
async fn audio_recipes_need_an_input_file() {
    let fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let client = fixture.client(dir.path());

    let (result, _) = run(&client, Recipe::AudioTranscription, None).await;
    assert!(matches!(result, Err(Error::Validation { .. })));

    let missing = dir.path().join("nope.wav");
    let (result, _) = run(
        &client,
        Recipe::StreamingTranscription,
        Some(missing.to_str().unwrap()),
    )
    .await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("nope.wav"));
}

#[tokio::test]
async fn hidden_reasoning_still_requests_thinking_mode() {
    let mut fixture = MockServerFixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let body = [
        r#"{"choices":[{"index":0,"delta":{"reasoning_content":"Check the clock first."}}]}"#,
        r#"{"choices":[{"index":0,"delta":{"content":"It is Monday."}}]}"#,
        r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#,
        "[DONE]",
    ]
    .iter()
    .map(|c| format!("data: {c}\n\n"))
    .collect::<String>();
    let chat = fixture
        .server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "stream": true,
            "tool_stream": true,
            "thinking": {"type": "enabled"}
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let client = fixture.client(dir.path());
    let (result, out) = run(&client, Recipe::MultiFunctionAgent, None).await;
    result.unwrap();
    chat.assert_async().await;
    assert!(out.contains("It is Monday."));
    assert!(!out.contains("Check the clock first."));
    assert!(!out.contains("[thinking]"));
}
