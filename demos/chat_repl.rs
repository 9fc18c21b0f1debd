//! Interactive chat against a streaming endpoint.
//!
//! Run with:
//! ```bash
//! export STREAMCHAT_ENDPOINT="http://127.0.0.1:8000/chat"
//! RUST_LOG=streamchat=debug cargo run --example chat_repl
//! ```
//!
//! Every line typed on stdin is submitted as one message. When stdin closes
//! the whole conversation is printed as HTML.

use streamchat::client::ChatClient;
use streamchat::options::{ChatOptions, HttpTransport, TransportOptions};
use streamchat::view::Transcript;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let transport = HttpTransport::from_env();
    println!("Chatting with {}", transport.endpoint);

    let client = ChatClient::connect(TransportOptions::new(transport), ChatOptions::default())?;
    println!("Session: {}\n", client.session());

    let view = Transcript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        // Empty lines are rejected by the client without a request.
        let turn = match client.submit(&line, &view).await {
            Ok(turn) => turn,
            Err(_) => continue,
        };

        println!("{}", turn.reply.message.content());
        if let Some(error) = turn.reply.error {
            eprintln!("[reply stopped: {}]", error);
        }
        println!();
    }

    println!("{}", view.to_html());
    Ok(())
}
