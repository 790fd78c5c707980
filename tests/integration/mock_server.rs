//! Mock HTTP server setup for integration tests

use glm_cookbook::{GlmClient, Settings};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::path::Path;

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Client pointed at the mock server, with samples looked up in `samples_dir`.
    /// This uses the base_url_override feature to inject the mock server URL
    pub fn client(&self, samples_dir: &Path) -> GlmClient {
        let settings = Settings::builder("test-key")
            .samples_dir(samples_dir)
            .build()
            .unwrap();
        GlmClient::builder()
            .settings(settings)
            .base_url_override(&self.base_url)
            .build()
            .unwrap()
    }

    /// Successful SSE response built from `data:` payloads.
    pub async fn mock_sse_stream(&mut self, path: &str, chunks: &[&str]) -> Mock {
        let body = chunks
            .iter()
            .map(|chunk| format!("data: {}\n\n", chunk))
            .collect::<String>();

        self.server
            .mock("POST", path)
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }

    /// Successful JSON response
    pub async fn mock_json_response(&mut self, method: &str, path: &str, body: &str) -> Mock {
        self.server
            .mock(method, path)
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// JSON response only when the request body contains `fragment`.
    pub async fn mock_json_matching(&mut self, path: &str, fragment: &str, body: &str) -> Mock {
        self.server
            .mock("POST", path)
            .match_body(Matcher::Regex(regex::escape(fragment)))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Error response with the provider's error envelope
    pub async fn mock_error_response(&mut self, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Guard that fails the test if any request reaches `path`.
    pub async fn mock_never_called(&mut self, path: &str) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(500)
            .expect(0)
            .create_async()
            .await
    }
}

