//! HTTP transport for the chat-completion endpoint.
//!
//! [`ChatClient`] performs one streaming POST per call and folds the decoded
//! deltas into an accumulating buffer, invoking the caller's callback with
//! the cumulative text after every non-empty delta. It never retries and it
//! never fails a call for a bad HTTP status: the body is drained either way
//! and the accumulated text is returned, so a transient endpoint hiccup
//! degrades to a partial answer instead of a dead turn. Callers needing
//! strict status semantics must check out-of-band.

use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client as ReqwestClient;
use url::Url;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::observability;
use crate::sse::{self, StreamFrame};
use crate::types::{ChatMessage, ChatRequest};

/// Per-fragment callback; receives the cumulative text, not the delta.
pub type TokenCallback<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// The transport seam the session orchestrator drives.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Establish any long-lived state a new session needs. Plain
    /// request/response transports have nothing to do here.
    async fn open_session(&self, _api_key: &str) -> Result<()> {
        Ok(())
    }

    /// Send one message list and stream the response, reporting cumulative
    /// text through `on_token`. Resolves with the full accumulated text.
    async fn send_chat(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        on_token: TokenCallback<'_>,
    ) -> Result<String>;
}

/// Streaming client for an OpenAI-style chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: ReqwestClient,
    endpoint: String,
    model: String,
    app_referer: Option<String>,
    app_title: Option<String>,
}

impl ChatClient {
    /// Creates a client from the resolved session configuration.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Url::parse(&config.endpoint)?;

        let http = ReqwestClient::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            app_referer: config.app_referer.clone(),
            app_title: config.app_title.clone(),
        })
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_headers(&self, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        headers.insert(AUTHORIZATION, bearer);
        if let Some(referer) = &self.app_referer
            && let Ok(value) = HeaderValue::from_str(referer)
        {
            headers.insert("HTTP-Referer", value);
        }
        if let Some(title) = &self.app_title
            && let Ok(value) = HeaderValue::from_str(title)
        {
            headers.insert("X-Title", value);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl Transport for ChatClient {
    async fn send_chat(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        on_token: TokenCallback<'_>,
    ) -> Result<String> {
        if messages.is_empty() {
            return Err(Error::validation(
                "message list must not be empty",
                Some("messages".to_string()),
            ));
        }

        observability::CLIENT_REQUESTS.click();
        let body = ChatRequest::new(self.model.clone(), messages.to_vec());

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.request_headers(api_key)?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                if e.is_timeout() {
                    Error::timeout(format!("Request timed out: {e}"), None)
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            observability::CLIENT_NON_SUCCESS_STATUS.click();
            tracing::warn!(status = %status, "chat endpoint returned non-success status");
        }

        let mut full_text = String::new();
        let mut frames = Box::pin(sse::frames(response.bytes_stream()));

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(StreamFrame::Delta(chunk)) => {
                    observability::STREAM_FRAMES.click();
                    if let Some(error) = &chunk.error {
                        observability::STREAM_INBAND_ERRORS.click();
                        tracing::warn!(
                            code = ?error.code,
                            message = error.message.as_deref().unwrap_or(""),
                            "stream reported an in-band error"
                        );
                    }
                    if let Some(delta) = chunk.delta_content() {
                        full_text.push_str(delta);
                        on_token(&full_text);
                    }
                }
                Ok(StreamFrame::Done) => {
                    // Terminal marker; the connection closes on its own.
                    observability::STREAM_FRAMES.click();
                }
                Ok(StreamFrame::OutOfBand(error)) => {
                    observability::STREAM_INBAND_ERRORS.click();
                    tracing::warn!(
                        code = ?error.code,
                        message = error.message.as_deref().unwrap_or(""),
                        "endpoint reported an error outside the data framing"
                    );
                }
                Err(err) if err.is_recoverable_stream_error() => {
                    observability::STREAM_MALFORMED.click();
                    tracing::warn!(error = %err, "skipping malformed stream data");
                }
                Err(err) => {
                    observability::CLIENT_REQUEST_ERRORS.click();
                    return Err(err);
                }
            }
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %full_text,
                "chat request failed; returning accumulated text"
            );
        }

        Ok(full_text)
    }
}
