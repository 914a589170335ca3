// Routeway HTTP client (reqwest direct, no SDK)

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::streaming::{dispatch_stream, ChunkStream, StreamCallbacks};
use crate::traits::ChatCompletions;
use crate::types::{CompletionResponse, CreateCompletionOptions, ModelResponse};

const COMPLETIONS_ENDPOINT: &str = "v1/chat/completions";
const MODELS_ENDPOINT: &str = "v1/models";

/// Routeway API client
///
/// ```rust,ignore
/// let client = Client::new(std::env::var("ROUTEWAY_API_KEY")?)?;
/// let response = client.chat().completions().create(options).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http_client: reqwest::Client,
    base_url: String,
    chat: Chat,
}

impl Client {
    /// Create new client with API key against the default endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).base_url(base_url).build()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut builder = Self::builder().api_key(config.api_key);
        if let Some(base_url) = config.base_url {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }

    /// Client configured from `ROUTEWAY_API_KEY` / `ROUTEWAY_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the models available to this API key
    pub async fn models(&self) -> Result<ModelResponse> {
        let url = format!("{}/{}", self.base_url, MODELS_ENDPOINT);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let response = ensure_success(response, "models").await?;

        response
            .json::<ModelResponse>()
            .await
            .context("Failed to parse models response")
    }
}

/// `client.chat()` namespace
#[derive(Debug, Clone)]
pub struct Chat {
    completions: Completions,
}

impl Chat {
    pub fn completions(&self) -> &Completions {
        &self.completions
    }
}

/// `client.chat().completions()`: the chat completion endpoint
#[derive(Debug, Clone)]
pub struct Completions {
    http_client: reqwest::Client,
    url: String,
}

impl Completions {
    /// Request a complete (non-streamed) response
    pub async fn create(&self, mut options: CreateCompletionOptions) -> Result<CompletionResponse> {
        if options.is_stream() {
            tracing::debug!("create() waits for the full response; clearing stream flag");
            options.stream = None;
        }

        let response = self.send(&options).await?;

        response
            .json::<CompletionResponse>()
            .await
            .context("Failed to parse completion response")
    }

    /// Stream a response, pushing each decoded chunk to `callbacks`
    ///
    /// Fails if the response has no body or no callbacks were given. A read
    /// failure mid-stream is reported to `on_error` and then returned.
    pub async fn create_stream(
        &self,
        options: CreateCompletionOptions,
        callbacks: Option<StreamCallbacks<'_>>,
    ) -> Result<()> {
        let response = self.send(&options.stream(true)).await?;
        dispatch_stream(streaming_body(response), callbacks).await?;
        Ok(())
    }

    /// Stream a response as a [`ChunkStream`] consumed at the caller's pace
    pub async fn create_iterator(&self, options: CreateCompletionOptions) -> Result<ChunkStream> {
        let response = self.send(&options.stream(true)).await?;
        Ok(ChunkStream::new(streaming_body(response))?)
    }

    async fn send(&self, options: &CreateCompletionOptions) -> Result<Response> {
        tracing::debug!(
            model = %options.model,
            messages = options.messages.len(),
            stream = options.is_stream(),
            "sending chat completion request"
        );

        let response = self
            .http_client
            .post(&self.url)
            .json(options)
            .send()
            .await
            .context("Failed to send request")?;

        ensure_success(response, "completion").await
    }
}

#[async_trait]
impl ChatCompletions for Completions {
    async fn create(&self, options: CreateCompletionOptions) -> Result<CompletionResponse> {
        Completions::create(self, options).await
    }

    async fn create_stream(
        &self,
        options: CreateCompletionOptions,
        callbacks: Option<StreamCallbacks<'_>>,
    ) -> Result<()> {
        Completions::create_stream(self, options, callbacks).await
    }

    async fn create_iterator(&self, options: CreateCompletionOptions) -> Result<ChunkStream> {
        Completions::create_iterator(self, options).await
    }
}

/// Builder for [`Client`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL, e.g. "http://localhost:8080"
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Overall request timeout, including reading a streamed body
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Client> {
        let api_key = self.api_key.context("API key is required")?;

        let mut config = ClientConfig::new(api_key);
        config.base_url = self.base_url;
        let base_url = config.effective_base_url();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .context("Invalid API key format")?,
        );

        let mut http_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            http_builder = http_builder.timeout(timeout);
        }
        let http_client = http_builder
            .build()
            .context("Failed to create HTTP client")?;

        let completions = Completions {
            http_client: http_client.clone(),
            url: format!("{}/{}", base_url, COMPLETIONS_ENDPOINT),
        };

        Ok(Client {
            http_client,
            base_url,
            chat: Chat { completions },
        })
    }
}

/// Fail with the server's error text on non-2xx
async fn ensure_success(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "Routeway API returned an error for {}", what);
    anyhow::bail!("Failed to fetch {} ({}): {}", what, status.as_u16(), error_text)
}

/// The readable body of a streamed response, if it has one
fn streaming_body(
    response: Response,
) -> Option<impl Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static> {
    if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
        return None;
    }
    Some(response.bytes_stream())
}
