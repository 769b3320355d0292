use super::*;
use futures_util::SinkExt;

#[tokio::test]
async fn ping_needs_no_token() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app).await;
    let mut ws = ws_connect(addr).await;

    ws_send(&mut ws, json!({"type": "ping"})).await;
    let msg = ws_expect_message(&mut ws, WAIT, |_| true).await;
    assert_eq!(msg, ServerMessage::Pong);

    server.abort();
}

#[tokio::test]
async fn missing_token_is_rejected_and_connection_stays_open() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app).await;
    let mut ws = ws_connect(addr).await;

    ws_send(
        &mut ws,
        json!({"type": "join_arena", "payload": join_payload("alice", "pve")}),
    )
    .await;
    let msg = ws_expect_message(&mut ws, WAIT, |_| true).await;
    assert_eq!(error_text(msg), "Authentication required");

    ws_send(&mut ws, json!({"type": "ping"})).await;
    let msg = ws_expect_message(&mut ws, WAIT, |_| true).await;
    assert_eq!(msg, ServerMessage::Pong);

    server.abort();
}

#[tokio::test]
async fn payload_user_must_match_token() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut ws = ws_connect(addr).await;

    ws_send_typed(
        &mut ws,
        "join_arena",
        &issue_token(&app, "alice"),
        join_payload("bob", "pve"),
    )
    .await;
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "User ID does not match token");
    assert!(app.connections.is_empty());

    server.abort();
}

#[tokio::test]
async fn forged_and_reserved_tokens_are_rejected() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut ws = ws_connect(addr).await;

    let forged = issue_token(&app, "alice").replace("alice", "mallory");
    ws_send_typed(&mut ws, "join_arena", &forged, join_payload("mallory", "pve")).await;
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Invalid token");

    ws_send_typed(&mut ws, "join_arena", &issue_token(&app, "AI"), join_payload("AI", "pve")).await;
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Invalid token");

    server.abort();
}

#[tokio::test]
async fn malformed_frames_get_protocol_errors() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut ws = ws_connect(addr).await;

    ws.send(tokio_tungstenite::tungstenite::Message::Text("{not json".into()))
        .await
        .unwrap();
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Invalid message format");

    ws_send_typed(&mut ws, "teleport", &issue_token(&app, "alice"), json!({})).await;
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Unknown message type: teleport");

    server.abort();
}
