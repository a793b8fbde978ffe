mod request_executor;


use bytes::Bytes;
use futures::{Stream, StreamExt};
use ollama_relay_types::protocol::openai::{
    ChatCompletionRequest, EmbeddingsRequest, EmbeddingsResponse,
};
use ollama_relay_types::GatewayError;
use reqwest::{Client, Response};
use std::fmt;
use std::time::Duration;

pub use request_executor::{build_url, extract_error_message};

const CHAT_COMPLETIONS: &str = "chat/completions";
const EMBEDDINGS: &str = "embeddings";

/// Client for a single OpenAI-compatible endpoint.
///
/// Built once per configuration snapshot; cloning is cheap (`reqwest::Client`
/// is reference counted).
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    request_timeout: Option<Duration>,
}

impl fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<none>" } else { "<redacted>" })
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl UpstreamClient {
    /// Create a new UpstreamClient with the given HTTP client.
    ///
    /// Accepts a pre-built `reqwest::Client` so timeout and proxy settings
    /// are decided by the caller.
    pub fn new(http_client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: None,
        }
    }

    /// Deadline for calls whose body is read in full.
    ///
    /// Streamed completions are exempt; they are bounded only by the idle
    /// timeout of the underlying client.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue `POST {base}/chat/completions` and hand back the raw response
    /// once its status is known to be 2xx.
    ///
    /// The body is left unread so the caller can either buffer it or consume
    /// it as an SSE byte stream.
    pub async fn chat_completions(
        &self,
        body: &ChatCompletionRequest,
    ) -> Result<Response, GatewayError> {
        request_executor::post_json(
            &self.http_client,
            &self.base_url,
            &self.api_key,
            CHAT_COMPLETIONS,
            body,
            if body.stream { None } else { self.request_timeout },
        )
        .await
    }

    /// Issue `POST {base}/embeddings`.
    pub async fn embeddings(
        &self,
        body: &EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, GatewayError> {
        let response = request_executor::post_json(
            &self.http_client,
            &self.base_url,
            &self.api_key,
            EMBEDDINGS,
            body,
            self.request_timeout,
        )
        .await?;
        read_json(response).await
    }
}

/// Read and parse a 2xx response body.
pub async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, GatewayError> {
    let bytes = response.bytes().await.map_err(|e| GatewayError::UpstreamUnreachable {
        message: e.to_string(),
        timed_out: e.is_timeout(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidUpstreamResponse {
        message: format!("could not parse upstream body: {}", e),
    })
}

/// Body of a streamed response as raw chunks, with read failures described.
pub fn byte_stream(response: Response) -> impl Stream<Item = Result<Bytes, String>> + Send {
    response.bytes_stream().map(|chunk| chunk.map_err(|e| describe_body_error(&e)))
}

fn describe_body_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        return "no data from upstream before the read timeout".to_string();
    }
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
