use crate::config::Settings;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

/// Thin reqwest wrapper bound to one base URL and one API key.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(30)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .user_agent(concat!("glm-cookbook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.api_key)
    }

    async fn send(req: RequestBuilder) -> Result<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        Self::check_status(resp).await
    }

    /// Turn a non-2xx response into `Error::Remote` carrying the provider's message.
    async fn check_status(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        debug!(status = status.as_u16(), body = %body, "remote error");
        Err(Error::from_remote_body(status.as_u16(), &body))
    }

    fn byte_stream(resp: Response) -> BoxStream<'static, Bytes> {
        Box::pin(
            resp.bytes_stream()
                .map_err(|e| Error::Transport(TransportError::Http(e))),
        )
    }

    async fn read_json(resp: Response) -> Result<serde_json::Value> {
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = self.url(path);
        debug!(method = "POST", url = %url, "sending JSON request");
        let resp = Self::send(self.authorized(self.client.post(&url)).json(body)).await?;
        Self::read_json(resp).await
    }

    /// POST a JSON body and hand back the raw SSE byte stream.
    pub async fn post_stream(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<BoxStream<'static, Bytes>> {
        let url = self.url(path);
        debug!(method = "POST", url = %url, "opening event stream");
        let req = self
            .authorized(self.client.post(&url))
            .header("accept", "text/event-stream")
            .json(body);
        let resp = Self::send(req).await?;
        Ok(Self::byte_stream(resp))
    }

    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<serde_json::Value> {
        let url = self.url(path);
        debug!(method = "POST", url = %url, "sending multipart request");
        let resp = Self::send(self.authorized(self.client.post(&url)).multipart(form)).await?;
        Self::read_json(resp).await
    }

    pub async fn post_multipart_stream(
        &self,
        path: &str,
        form: Form,
    ) -> Result<BoxStream<'static, Bytes>> {
        let url = self.url(path);
        debug!(method = "POST", url = %url, "opening multipart event stream");
        let req = self
            .authorized(self.client.post(&url))
            .header("accept", "text/event-stream")
            .multipart(form);
        let resp = Self::send(req).await?;
        Ok(Self::byte_stream(resp))
    }

    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.url(path);
        debug!(method = "GET", url = %url, "sending request");
        let resp = Self::send(self.authorized(self.client.get(&url))).await?;
        Self::read_json(resp).await
    }

    /// Download a generated asset. Result URLs are pre-signed, so no credentials are sent.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        debug!(url = %url, "downloading asset");
        let resp = Self::send(self.client.get(url)).await?;
        resp.bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
