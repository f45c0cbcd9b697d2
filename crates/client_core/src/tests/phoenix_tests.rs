use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::mpsc};

use crate::{
    channel::{ChannelClient, TransportEvent},
    phoenix::{classify_frame, websocket_url, PhoenixSocket},
};

#[test]
fn websocket_url_converts_scheme_and_appends_socket_path() {
    assert_eq!(
        websocket_url("https://explorer.example/").expect("https"),
        "wss://explorer.example/socket/websocket?vsn=2.0.0"
    );
    assert_eq!(
        websocket_url("http://127.0.0.1:4000").expect("http"),
        "ws://127.0.0.1:4000/socket/websocket?vsn=2.0.0"
    );
    assert!(websocket_url("explorer.example").is_err());
}

#[test]
fn classifies_error_and_close_frames_as_transport_errors() {
    assert!(matches!(
        classify_frame(r#"[null,null,"addresses:0xabc","phx_error",{}]"#),
        Some(TransportEvent::Error(_))
    ));
    assert!(matches!(
        classify_frame(r#"["1","1","addresses:0xabc","phx_close",{}]"#),
        Some(TransportEvent::Error(_))
    ));
    assert!(matches!(
        classify_frame(r#"["1","1","addresses:0xabc","phx_reply",{"status":"error"}]"#),
        Some(TransportEvent::Error(_))
    ));
}

#[test]
fn ignores_acks_heartbeats_and_garbage() {
    assert_eq!(
        classify_frame(r#"["1","1","addresses:0xabc","phx_reply",{"status":"ok"}]"#),
        None
    );
    assert_eq!(
        classify_frame(r#"[null,"4","phoenix","phx_reply",{"status":"ok"}]"#),
        None
    );
    assert_eq!(classify_frame("not json"), None);
}

#[test]
fn passes_application_events_through() {
    assert_eq!(
        classify_frame(r#"[null,null,"addresses:0xabc","verification",{"verification_result":"ok"}]"#),
        Some(TransportEvent::Message {
            topic: "addresses:0xabc".into(),
            event: "verification".into(),
            payload: json!({"verification_result": "ok"}),
        })
    );
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(joins): State<mpsc::UnboundedSender<String>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, joins))
}

async fn serve_socket(mut socket: WebSocket, joins: mpsc::UnboundedSender<String>) {
    if let Some(Ok(Message::Text(join))) = socket.recv().await {
        let _ = joins.send(join);
        let reply = r#"["1","1","addresses:0xabc","phx_reply",{"status":"ok","response":{}}]"#;
        let push =
            r#"[null,null,"addresses:0xabc","verification",{"verification_result":"<form/>"}]"#;
        let _ = socket.send(Message::Text(reply.to_string())).await;
        let _ = socket.send(Message::Text(push.to_string())).await;
    }
    let _ = socket.send(Message::Close(None)).await;
}

async fn spawn_socket_server() -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/socket/websocket", get(ws_handler))
        .with_state(tx);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

#[tokio::test]
async fn joins_topic_and_delivers_pushes_then_reports_close() {
    let (server_url, mut joins) = spawn_socket_server().await;
    let url = websocket_url(&server_url).expect("url");

    let (socket, mut events) = PhoenixSocket::connect(&url, Duration::from_secs(30))
        .await
        .expect("connect");
    let client = ChannelClient::new(socket);
    client
        .subscribe::<()>("addresses:0xabc")
        .await
        .expect("subscribe");

    let join = tokio::time::timeout(Duration::from_secs(5), joins.recv())
        .await
        .expect("join in time")
        .expect("join frame");
    assert_eq!(join, r#"["1","1","addresses:0xabc","phx_join",{}]"#);

    let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("push in time")
        .expect("push");
    assert_eq!(
        first,
        TransportEvent::Message {
            topic: "addresses:0xabc".into(),
            event: "verification".into(),
            payload: json!({"verification_result": "<form/>"}),
        }
    );

    let second = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("close in time")
        .expect("close");
    assert!(matches!(second, TransportEvent::Error(_)));
}

#[tokio::test]
async fn connect_failure_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let result = PhoenixSocket::connect(
        &format!("ws://{addr}/socket/websocket?vsn=2.0.0"),
        Duration::from_secs(30),
    )
    .await;
    assert!(result.is_err());
}
