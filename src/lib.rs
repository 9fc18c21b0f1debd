//! # streamchat - Streaming Chat Client
//!
//! A small client library for chat endpoints that answer with a plain,
//! chunked text body. Each reply is decoded incrementally, accumulated and
//! re-rendered from Markdown to HTML into an abstract view as it arrives.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Chunk-boundary-safe UTF-8 decoding
//! - Markdown rendering with external-link decoration
//! - Trait-based transport and view seams for testing and embedding
//! - Documentation sidebar generation for the accompanying docs site
//!
//! ## Architecture
//!
//! - **`ChatClient`**: owns the session id, submits messages, runs the
//!   read → decode → accumulate → render loop
//! - **`ChatTransport`**: sends one request, returns the body as a byte stream
//!   (`HttpChatTransport` for real endpoints)
//! - **`Renderer`**: pure text → HTML function, composed with `ExternalLinks`
//! - **`ChatView`** / **`RenderTarget`**: display slots the client writes into
//!
//! ## Example
//! ```no_run
//! use streamchat::client::ChatClient;
//! use streamchat::options::{ChatOptions, HttpTransport, TransportOptions};
//! use streamchat::view::Transcript;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ChatClient::connect(
//!         TransportOptions::new(HttpTransport::new("http://localhost:8000/chat")),
//!         ChatOptions::default(),
//!     )?;
//!     let view = Transcript::new();
//!
//!     let turn = client.submit("Hello!", &view).await?;
//!     println!("{}", turn.reply.message.content());
//!     println!("{}", view.to_html());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod decode;
pub mod http;
pub mod model;
pub mod options;
pub mod render;
pub mod session;
pub mod sidebar;
pub mod view;

// Re-exports for convenience
pub use client::{ChatClient, ChatError, ChatTransport, ErrorKind, Reply, Turn};
pub use model::{Message, Role};
pub use session::SessionId;
pub use view::{ChatView, RenderTarget, Transcript};
