//! Streaming chat client, its transport seam and error types.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::decode::{DecodeError, Utf8StreamDecoder};
use crate::http::HttpChatTransport;
use crate::model::{AssistantReply, ChatRequest, Message, Role};
use crate::options::{ChatOptions, HttpTransport, TransportOptions};
use crate::render::{fallback_html, ExternalLinks, MarkdownRenderer, RenderError, Renderer};
use crate::session::SessionId;
use crate::view::{ChatView, RenderTarget};

/// Errors that can occur while submitting a message or consuming its reply.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`ChatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally, nothing was sent.
    Validation,
    /// No readable body was obtained.
    Transport,
    /// The body broke off or could not be decoded.
    Stream,
    /// The renderer could not process the text.
    Render,
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::EmptyMessage => ErrorKind::Validation,
            ChatError::Http(_) | ChatError::Status { .. } | ChatError::Config(_) => {
                ErrorKind::Transport
            }
            ChatError::Stream(_) | ChatError::Decode(_) => ErrorKind::Stream,
            ChatError::Render(_) => ErrorKind::Render,
        }
    }
}

/// Raw response body, one item per chunk in arrival order.
pub type ByteStream = BoxStream<'static, Result<Bytes, ChatError>>;

/// Sends one chat request and yields its streamed reply body.
///
/// Implementations fail with a transport-kind [`ChatError`] when no
/// readable body can be obtained (connection failure, non-2xx status).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ByteStream, ChatError>;
}

/// Assistant side of a turn.
#[derive(Debug)]
pub struct Reply {
    /// Everything that arrived before the stream ended or failed.
    pub message: Message,

    /// Why the stream stopped early, if it did.
    pub error: Option<ChatError>,
}

impl Reply {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// One user message and the reply it produced.
#[derive(Debug)]
pub struct Turn {
    pub user: Message,
    pub reply: Reply,
}

/// Client that submits messages and renders their streamed replies.
///
/// The session id is fixed at construction and attached to every request.
/// The client keeps no per-request state, so a failed reply never blocks
/// the next submission.
pub struct ChatClient<T, R = ExternalLinks<MarkdownRenderer>> {
    session: SessionId,
    transport: T,
    renderer: R,
    options: ChatOptions,
}

impl ChatClient<HttpChatTransport> {
    /// Create a client talking HTTP to the endpoint in `transport_options`.
    pub fn connect(
        transport_options: TransportOptions<HttpTransport>,
        options: ChatOptions,
    ) -> Result<Self, ChatError> {
        Ok(Self::new(HttpChatTransport::new(transport_options)?, options))
    }
}

impl<T: ChatTransport> ChatClient<T> {
    /// Create a client with a fresh session and the default Markdown renderer.
    pub fn new(transport: T, options: ChatOptions) -> Self {
        let renderer =
            ExternalLinks::new(MarkdownRenderer::new().with_max_len(options.max_render_len));
        let session = SessionId::generate();
        info!(session = %session, "chat session started");
        Self {
            session,
            transport,
            renderer,
            options,
        }
    }
}

impl<T: ChatTransport, R: Renderer> ChatClient<T, R> {
    /// Replace the renderer.
    pub fn with_renderer<R2: Renderer>(self, renderer: R2) -> ChatClient<T, R2> {
        ChatClient {
            session: self.session,
            transport: self.transport,
            renderer,
            options: self.options,
        }
    }

    /// Use a caller-provided session id instead of the generated one.
    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Render `text`, falling back to escaped plain text if the renderer fails.
    pub fn render(&self, text: &str) -> String {
        self.renderer.render(text).unwrap_or_else(|e| {
            warn!(error = %e, "renderer failed, showing plain text");
            fallback_html(text)
        })
    }

    /// Submit user input and stream the reply into `view`.
    ///
    /// Whitespace-only input is rejected with [`ChatError::EmptyMessage`]
    /// before anything is displayed or sent. Otherwise the user message and
    /// an empty assistant slot are created first, then the reply streams in.
    /// Failures of the reply itself are reported in [`Reply::error`].
    pub async fn submit<V: ChatView + ?Sized>(
        &self,
        input: &str,
        view: &V,
    ) -> Result<Turn, ChatError> {
        if input.trim().is_empty() {
            debug!("ignoring empty submission");
            return Err(ChatError::EmptyMessage);
        }

        let user = Message::user(input);
        RenderTarget::create(view, Role::User).write(view, &self.render(user.content()));
        view.clear_input();

        let target = RenderTarget::create(view, Role::Assistant);
        if self.options.follow_output {
            view.scroll_to_latest();
        }

        let reply = self.stream_reply(user.content(), target, view).await;
        Ok(Turn { user, reply })
    }

    /// Send `message` and render the streamed reply into `target`.
    ///
    /// The target is owned by this call, so concurrent replies sharing one
    /// view never write into each other's slot.
    pub async fn stream_reply<V: ChatView + ?Sized>(
        &self,
        message: &str,
        target: RenderTarget,
        view: &V,
    ) -> Reply {
        let mut reply = AssistantReply::new();
        let result = self.consume(message, &target, view, &mut reply).await;

        match &result {
            Ok(()) => info!(
                session = %self.session,
                appends = reply.appends(),
                bytes = reply.content().len(),
                "reply complete"
            ),
            Err(e) => warn!(
                session = %self.session,
                appends = reply.appends(),
                error = %e,
                "reply stopped"
            ),
        }

        Reply {
            message: reply.finish(),
            error: result.err(),
        }
    }

    async fn consume<V: ChatView + ?Sized>(
        &self,
        message: &str,
        target: &RenderTarget,
        view: &V,
        reply: &mut AssistantReply,
    ) -> Result<(), ChatError> {
        let request = ChatRequest::new(message, &self.session);
        let mut body = self.transport.send(&request).await?;
        let mut decoder = Utf8StreamDecoder::new(self.options.decode_mode);

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            debug!(bytes = chunk.len(), "chunk received");
            let text = decoder.decode(&chunk)?;
            self.append(&text, reply, target, view);
        }

        let tail = decoder.finish()?;
        self.append(&tail, reply, target, view);
        Ok(())
    }

    fn append<V: ChatView + ?Sized>(
        &self,
        text: &str,
        reply: &mut AssistantReply,
        target: &RenderTarget,
        view: &V,
    ) {
        if text.is_empty() {
            return;
        }
        reply.push_str(text);
        // Always the full text: an open code fence only parses against the whole reply.
        target.write(view, &self.render(reply.content()));
        if self.options.follow_output {
            view.scroll_to_latest();
        }
    }
}
