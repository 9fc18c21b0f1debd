//! HTTP transport for the chat endpoint.
//!
//! One POST per message with a form-encoded body. The response body is
//! handed back untouched as a stream of byte chunks.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;
use tracing::debug;

use crate::client::{ByteStream, ChatError, ChatTransport};
use crate::model::ChatRequest;
use crate::options::{HttpTransport, TransportOptions};

/// Build a configured HTTP client from transport options.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(
    transport_options: &TransportOptions<HttpTransport>,
) -> Result<Client, ChatError> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.provider.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ChatError::Config(format!("invalid proxy {}: {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// [`ChatTransport`] speaking plain HTTP to a streaming chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: Client,
    options: TransportOptions<HttpTransport>,
}

impl HttpChatTransport {
    pub fn new(options: TransportOptions<HttpTransport>) -> Result<Self, ChatError> {
        let client = build_http_client(&options)?;
        Ok(Self { client, options })
    }

    pub fn endpoint(&self) -> &str {
        &self.options.provider.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
        debug!(endpoint = %self.endpoint(), session = %request.session_id, "posting chat message");

        let mut req = self.client.post(self.endpoint()).form(request);
        req = add_extra_headers(req, &self.options.provider.extra_headers);

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| ChatError::Stream(e.to_string()))
            .boxed())
    }
}
