//! Integration tests for the HTTP transport and the full submit → stream → render path.

use std::time::Duration;

use streamchat::client::{ChatClient, ChatError, ErrorKind};
use streamchat::options::{ChatOptions, HttpTransport, TransportOptions};
use streamchat::view::{SlotId, Transcript};
use streamchat::SessionId;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(endpoint: String) -> ChatClient<streamchat::http::HttpChatTransport> {
    ChatClient::connect(
        TransportOptions::new(HttpTransport::new(endpoint)),
        ChatOptions::default(),
    )
    .expect("client should build")
}

#[tokio::test]
async fn test_posts_form_encoded_message_and_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("message=hello"))
        .and(body_string_contains("session_id=session_42_abcdefghi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello!"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(format!("{}/chat", server.uri()))
        .with_session(SessionId::from("session_42_abcdefghi"));
    let view = Transcript::new();

    let turn = client.submit("hello", &view).await.unwrap();

    assert!(turn.reply.is_complete());
    assert_eq!(turn.reply.message.content(), "Hello!");
    assert_eq!(view.entry(SlotId(1)).unwrap().html, "<p>Hello!</p>\n");
}

#[tokio::test]
async fn test_message_text_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("message=what+is+1%2B1%3F"))
        .respond_with(ResponseTemplate::new(200).set_body_string("2"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let turn = client.submit("what is 1+1?", &Transcript::new()).await.unwrap();
    assert_eq!(turn.reply.message.content(), "2");
}

#[tokio::test]
async fn test_same_session_on_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let view = Transcript::new();
    client.submit("one", &view).await.unwrap();
    client.submit("two", &view).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let expected = format!("session_id={}", client.session());
    for request in requests {
        let body = String::from_utf8(request.body).unwrap();
        assert!(body.contains(&expected), "{}", body);
    }
}

#[tokio::test]
async fn test_extra_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-client", "streamchat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(server.uri())
        .with_header("X-Client".to_string(), "streamchat".to_string());
    let client = ChatClient::connect(TransportOptions::new(transport), ChatOptions::default()).unwrap();

    let turn = client.submit("hi", &Transcript::new()).await.unwrap();
    assert!(turn.reply.is_complete());
}

#[tokio::test]
async fn test_server_error_leaves_reply_empty_and_form_usable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let view = Transcript::new();

    let failed = client.submit("first", &view).await.unwrap();
    match &failed.reply.error {
        Some(ChatError::Status { status, body }) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "internal");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert_eq!(failed.reply.message.content(), "");
    assert_eq!(view.entry(SlotId(1)).unwrap().html, "");

    let next = client.submit("second", &view).await.unwrap();
    assert!(next.reply.is_complete());
    assert_eq!(view.entry(SlotId(3)).unwrap().html, "<p>recovered</p>\n");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = client_for(format!("http://127.0.0.1:{}/chat", port));
    let turn = client.submit("anyone?", &Transcript::new()).await.unwrap();

    assert_eq!(turn.reply.error.unwrap().kind(), ErrorKind::Transport);
}

/// Serve one request with a chunked body written piece by piece.
async fn serve_chunked(listener: TcpListener, pieces: Vec<Vec<u8>>) {
    let (mut socket, _) = listener.accept().await.unwrap();

    // Read the whole request so closing the socket does not reset it.
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        if let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= head_end + 4 + body_len {
                break;
            }
        }
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            return;
        }
        request.extend_from_slice(&buf[..n]);
    }

    socket
        .write_all(
            b"HTTP/1.1 200 OK\r\n\
              content-type: text/plain; charset=utf-8\r\n\
              transfer-encoding: chunked\r\n\
              connection: close\r\n\r\n",
        )
        .await
        .unwrap();

    for piece in pieces {
        socket
            .write_all(format!("{:x}\r\n", piece.len()).as_bytes())
            .await
            .unwrap();
        socket.write_all(&piece).await.unwrap();
        socket.write_all(b"\r\n").await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    socket.write_all(b"0\r\n\r\n").await.unwrap();
    socket.flush().await.unwrap();
}

#[tokio::test]
async fn test_multibyte_char_split_across_http_chunks() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let text = "Hi 안녕 €!";
    let bytes = text.as_bytes();
    // Cut inside the 3-byte '안' and inside the 3-byte '€' (2 + 1).
    let first_cut = 4;
    let euro_start = text.find('€').unwrap();
    let pieces = vec![
        bytes[..first_cut].to_vec(),
        bytes[first_cut..euro_start + 2].to_vec(),
        bytes[euro_start + 2..].to_vec(),
    ];
    let server = tokio::spawn(serve_chunked(listener, pieces));

    let client = client_for(format!("http://127.0.0.1:{}/chat", port));
    let view = Transcript::new();
    let turn = client.submit("greet me", &view).await.unwrap();
    server.await.unwrap();

    assert!(turn.reply.is_complete(), "{:?}", turn.reply.error);
    assert_eq!(turn.reply.message.content(), text);
    let html = view.entry(SlotId(1)).unwrap().html;
    assert!(!html.contains('\u{FFFD}'));
    assert_eq!(html, format!("<p>{}</p>\n", text));
}

#[tokio::test]
async fn test_links_in_streamed_reply_open_in_new_tab() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("See [the docs](https://docs.example) or <https://x.example>."),
        )
        .mount(&server)
        .await;

    let client = client_for(server.uri());
    let view = Transcript::new();
    client.submit("where?", &view).await.unwrap();

    let html = view.entry(SlotId(1)).unwrap().html;
    assert_eq!(html.matches("<a ").count(), 2);
    assert_eq!(
        html.matches(r#"target="_blank" rel="noopener noreferrer""#).count(),
        2
    );
}
