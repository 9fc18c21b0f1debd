//! Option structures for the chat client and its HTTP transport.

use std::collections::HashMap;
use std::time::Duration;

/// Environment variable read by [`HttpTransport::from_env`].
pub const ENDPOINT_ENV: &str = "STREAMCHAT_ENDPOINT";

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/chat";

/// How the stream decoder treats bytes that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Replace invalid sequences with U+FFFD and keep going.
    #[default]
    Lossy,
    /// Fail the stream on the first invalid sequence.
    Strict,
}

/// Client behavior options.
///
/// # Example
/// ```rust
/// use streamchat::options::{ChatOptions, DecodeMode};
///
/// let options = ChatOptions::default()
///     .with_decode_mode(DecodeMode::Strict)
///     .with_follow_output(false);
/// assert!(!options.follow_output);
/// ```
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Scroll the view to the newest content after every render
    pub follow_output: bool,

    /// Treatment of invalid UTF-8 in the response body
    pub decode_mode: DecodeMode,

    /// Inputs longer than this (in bytes) are not handed to the Markdown renderer
    pub max_render_len: Option<usize>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            follow_output: true,
            decode_mode: DecodeMode::Lossy,
            max_render_len: None,
        }
    }
}

impl ChatOptions {
    /// Enable or disable scroll-follow.
    pub fn with_follow_output(mut self, follow: bool) -> Self {
        self.follow_output = follow;
        self
    }

    /// Set the decode mode.
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// Set the maximum text length handed to the renderer.
    pub fn with_max_render_len(mut self, len: usize) -> Self {
        self.max_render_len = Some(len);
        self
    }
}

/// Generic transport options containing truly generic transport fields
/// and transport-specific configuration.
///
/// # Example
/// ```rust
/// use streamchat::options::{HttpTransport, TransportOptions};
/// use std::time::Duration;
///
/// let options = TransportOptions::new(HttpTransport::new("http://localhost:8000/chat"))
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(options.timeout, Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions<T> {
    /// Request timeout. `None` lets a stalled server stream forever.
    pub timeout: Option<Duration>,

    /// Transport-specific options
    pub provider: T,
}

impl<T> TransportOptions<T> {
    /// Create new transport options with no timeout.
    pub fn new(provider: T) -> Self {
        Self {
            timeout: None,
            provider,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP-specific transport options.
/// Used as the provider field in `TransportOptions<HttpTransport>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Full URL of the chat endpoint
    pub endpoint: String,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl HttpTransport {
    /// Create HTTP transport options for an endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            proxy: None,
            extra_headers: None,
        }
    }

    /// Read the endpoint from `STREAMCHAT_ENDPOINT`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var(ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => Self::new(endpoint.trim()),
            _ => Self::default(),
        }
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}
