use crate::client::core::GlmClient;
use crate::config::Settings;
use crate::Result;

/// Builder for creating clients with custom configuration.
///
/// Without explicit settings, [`Settings::load`] runs at `build()`, so a
/// missing credential fails here, before any request is attempted.
#[derive(Default)]
pub struct GlmClientBuilder {
    settings: Option<Settings>,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
}

impl GlmClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Override the configured base URL.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<GlmClient> {
        let mut settings = match self.settings {
            Some(s) => s,
            None => Settings::load()?,
        };
        if let Some(url) = self.base_url_override {
            settings.base_url = if url.ends_with('/') {
                url
            } else {
                format!("{url}/")
            };
        }
        GlmClient::new(settings)
    }
}
