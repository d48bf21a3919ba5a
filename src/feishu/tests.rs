use super::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::card::render_unknown;

type Received = Arc<Mutex<Vec<Value>>>;

/// Start a fake bot endpoint answering every POST with `status` and `reply`
async fn fake_bot(status: StatusCode, reply: Value) -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route(
            "/hook",
            post(
                move |State(received): State<Received>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        received.lock().unwrap().push(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/hook", addr), received)
}

fn client(url: &str) -> FeishuClient {
    FeishuClient::new(url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn send_posts_card_json() {
    let (url, received) = fake_bot(StatusCode::OK, json!({"code": 0, "msg": "success"})).await;
    let card = render_unknown(&json!({"hello": "world"}));

    client(&url).send(&card).await.unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0], serde_json::to_value(&card).unwrap());
    assert_eq!(received[0]["msg_type"], "interactive");
}

#[tokio::test]
async fn send_fails_on_http_error() {
    let (url, _) = fake_bot(StatusCode::BAD_GATEWAY, json!({})).await;
    let card = render_unknown(&json!({}));

    let err = client(&url).send(&card).await.unwrap_err();
    assert!(err.to_string().contains("HTTP 502"), "{}", err);
}

#[tokio::test]
async fn send_fails_on_bot_rejection() {
    let (url, _) = fake_bot(
        StatusCode::OK,
        json!({"code": 19001, "msg": "param invalid: incoming webhook access token invalid"}),
    )
    .await;
    let card = render_unknown(&json!({}));

    let err = client(&url).send(&card).await.unwrap_err();
    assert!(err.to_string().contains("code 19001"), "{}", err);
}

#[tokio::test]
async fn send_fails_on_legacy_status_code() {
    let (url, _) = fake_bot(
        StatusCode::OK,
        json!({"StatusCode": 9499, "StatusMessage": "Bad Request"}),
    )
    .await;
    let card = render_unknown(&json!({}));

    let err = client(&url).send(&card).await.unwrap_err();
    assert!(err.to_string().contains("Bad Request"), "{}", err);
}

#[tokio::test]
async fn send_accepts_legacy_success() {
    let (url, _) = fake_bot(
        StatusCode::OK,
        json!({"Extra": null, "StatusCode": 0, "StatusMessage": "success"}),
    )
    .await;
    let card = render_unknown(&json!({}));

    assert!(client(&url).send(&card).await.is_ok());
}

#[tokio::test]
async fn send_fails_when_unreachable() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let card = render_unknown(&json!({}));
    let err = client(&format!("http://{}/hook", addr))
        .send(&card)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to reach Feishu webhook"));
}

/// Accept one request, answer 200 with a body cut short of its Content-Length
async fn truncated_bot() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"code\":0")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{}/hook", addr)
}

/// Headers received and the body matches its Content-Length
fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(end) = text.find("\r\n\r\n") else {
        return false;
    };
    let length = text[..end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    request.len() >= end + 4 + length
}

#[tokio::test]
async fn send_fails_when_reply_is_cut_short() {
    let url = truncated_bot().await;
    let card = render_unknown(&json!({}));

    let err = client(&url).send(&card).await.unwrap_err();
    assert!(
        err.to_string().contains("Failed to read Feishu reply"),
        "{:#}",
        err
    );
}

#[test]
fn rejection_parsing() {
    let ok: BotResponse = serde_json::from_value(json!({"code": 0, "msg": "success"})).unwrap();
    assert!(ok.rejection().is_none());

    let empty = BotResponse::default();
    assert!(empty.rejection().is_none());

    let bad: BotResponse = serde_json::from_value(json!({"code": 11232, "msg": "frequency limited"})).unwrap();
    assert_eq!(bad.rejection(), Some((11232, "frequency limited")));
}
