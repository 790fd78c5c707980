use crate::client::chat::ChatRequestBuilder;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::transport::HttpTransport;
use crate::Result;
use bytes::Bytes;
use std::sync::Arc;

/// Client bound to one set of [`Settings`].
///
/// Cheap to clone; transport and pipeline are shared.
#[derive(Clone)]
pub struct GlmClient {
    pub(crate) settings: Arc<Settings>,
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) pipeline: Arc<Pipeline>,
}

impl GlmClient {
    /// Build a client from already-loaded settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let transport = HttpTransport::new(&settings)?;
        Ok(Self {
            settings: Arc::new(settings),
            transport: Arc::new(transport),
            pipeline: Arc::new(Pipeline::sse()),
        })
    }

    pub fn builder() -> crate::client::GlmClientBuilder {
        crate::client::GlmClientBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start a chat completion request.
    pub fn chat(&self) -> ChatRequestBuilder<'_> {
        ChatRequestBuilder::new(self)
    }

    /// Fetch a generated asset by URL.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        self.transport.download(url).await
    }
}

impl std::fmt::Debug for GlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlmClient")
            .field("base_url", &self.transport.base_url())
            .finish_non_exhaustive()
    }
}
