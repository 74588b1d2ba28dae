//! HTTP transport for Responses-compatible LLM gateways.
//!
//! [`HttpGateway`] wraps a `reqwest::Client` with pre-configured headers
//! and endpoint URL. Provides `complete()` for non-streaming and SSE
//! parsing for `complete_stream()`.

use crate::{Gateway, General, Item, Request, Response, StreamEvent};
use anyhow::Result;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderValue},
};

/// Responses-compatible endpoint URLs.
pub mod endpoint {
    /// OpenAI responses.
    pub const OPENAI: &str = "https://api.openai.com/v1/responses";
}

/// An HTTP gateway to a Responses-compatible API.
///
/// Holds a `reqwest::Client`, pre-built headers (auth + content-type),
/// and the target endpoint URL.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl HttpGateway {
    /// Create a gateway targeting the OpenAI API.
    pub fn api(client: Client, key: &str) -> Result<Self> {
        Self::custom(client, key, endpoint::OPENAI)
    }

    /// Create a gateway targeting a custom Responses-compatible endpoint.
    pub fn custom(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Gateway for HttpGateway {
    async fn complete(&self, config: &General, input: &[Item]) -> Result<Response> {
        let body = Request::from(config).input(input);
        tracing::trace!("request: {}", serde_json::to_string(&body)?);
        let text = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        tracing::trace!("response: {text}");
        serde_json::from_str(&text).map_err(Into::into)
    }

    fn complete_stream(
        &self,
        config: General,
        input: &[Item],
    ) -> impl Stream<Item = Result<StreamEvent>> + Send {
        let body = Request::from(&config).input(input).stream();
        if let Ok(body) = serde_json::to_string(&body) {
            tracing::trace!("request: {}", body);
        }
        let request = self
            .client
            .request(Method::POST, &self.endpoint)
            .headers(self.headers.clone())
            .json(&body);

        try_stream! {
            let response = request.send().await?.error_for_status()?;
            let mut stream = response.bytes_stream();
            while let Some(next) = stream.next().await {
                let bytes = next?;
                let text = String::from_utf8_lossy(&bytes);
                tracing::trace!("chunk: {}", text);
                for line in text.lines() {
                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    let trimmed = data.trim();
                    if trimmed.is_empty() || trimmed.starts_with("[DONE]") {
                        continue;
                    }
                    match serde_json::from_str::<StreamEvent>(trimmed) {
                        Ok(event) => yield event,
                        Err(e) => tracing::warn!("failed to parse event: {e}, data: {trimmed}"),
                    }
                }
            }
        }
    }
}
