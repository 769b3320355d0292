use std::{net::SocketAddr, sync::Arc, time::Duration};

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

use questarena_domain::{SkillCatalog, UserId};
use questarena_shared::ServerMessage;

use crate::app::{App, Ports};
use crate::infrastructure::auth::SignedTokenVerifier;
use crate::infrastructure::clock::{FixedRandom, SystemClock};
use crate::infrastructure::config::ArenaConfig;
use crate::infrastructure::profile_store::InMemoryProfileStore;

pub(crate) type TestWs =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub(crate) const TEST_TOKEN_SECRET: &str = "arena-test-secret";

pub(crate) const STANDARD_SKILLS: [&str; 4] = ["fireball", "heal", "shield", "quick_jab"];

/// Config with short AI delays so PvE tests finish quickly.
pub(crate) fn test_config() -> ArenaConfig {
    ArenaConfig {
        token_secret: TEST_TOKEN_SECRET.to_string(),
        ai_delay_min_ms: 10,
        ai_delay_max_ms: 20,
        ..ArenaConfig::default()
    }
}

pub(crate) fn test_ports() -> Ports {
    let clock = Arc::new(SystemClock::new());
    Ports {
        clock: clock.clone(),
        // Rolls of 0 keep damage and heal amounts at skill power.
        random: Arc::new(FixedRandom(0)),
        tokens: Arc::new(SignedTokenVerifier::new(TEST_TOKEN_SECRET, clock)),
        profiles: Arc::new(InMemoryProfileStore::new()),
        history: None,
    }
}

pub(crate) fn build_test_app() -> Arc<App> {
    build_test_app_with(test_config(), |_| {})
}

pub(crate) fn build_test_app_with(
    config: ArenaConfig,
    customize: impl FnOnce(&mut Ports),
) -> Arc<App> {
    let mut ports = test_ports();
    customize(&mut ports);
    Arc::new(App::new(config, SkillCatalog::standard(), ports))
}

/// A token for `user` valid for the next hour.
pub(crate) fn issue_token(app: &App, user: &str) -> String {
    SignedTokenVerifier::new(TEST_TOKEN_SECRET, app.clock.clone())
        .issue(&UserId::new(user), Utc::now() + chrono::Duration::hours(1))
}

pub(crate) async fn spawn_ws_server(app: Arc<App>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = crate::api::router(app);

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

pub(crate) async fn ws_connect(addr: SocketAddr) -> TestWs {
    let url = format!("ws://{}/ws", addr);
    let (ws, _resp) = connect_async(url).await.unwrap();
    ws
}

pub(crate) async fn ws_send(ws: &mut TestWs, frame: Value) {
    ws.send(WsMessage::Text(frame.to_string().into()))
        .await
        .unwrap();
}

/// Send `{type, token, payload}`.
pub(crate) async fn ws_send_typed(ws: &mut TestWs, message_type: &str, token: &str, payload: Value) {
    ws_send(
        ws,
        json!({"type": message_type, "token": token, "payload": payload}),
    )
    .await;
}

pub(crate) fn join_payload(user: &str, mode: &str) -> Value {
    json!({
        "userId": user,
        "username": user,
        "skills": STANDARD_SKILLS,
        "mode": mode,
    })
}

/// Next server message, or `None` once the socket is closed.
pub(crate) async fn ws_recv_server(ws: &mut TestWs) -> Option<ServerMessage> {
    loop {
        match ws.next().await? {
            Ok(WsMessage::Text(text)) => {
                return Some(serde_json::from_str::<ServerMessage>(&text).unwrap());
            }
            Ok(WsMessage::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

pub(crate) async fn ws_expect_message<F>(
    ws: &mut TestWs,
    timeout: Duration,
    mut predicate: F,
) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws)
                .await
                .expect("socket closed while waiting for message");
            if predicate(&msg) {
                return msg;
            }
        }
    })
    .await
    .unwrap()
}

pub(crate) async fn ws_expect_no_message_matching<F>(
    ws: &mut TestWs,
    timeout: Duration,
    mut predicate: F,
) where
    F: FnMut(&ServerMessage) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        while let Some(msg) = ws_recv_server(ws).await {
            if predicate(&msg) {
                panic!("unexpected message: {:?}", msg);
            }
        }
        // Closed: nothing more can arrive.
        std::future::pending::<()>().await;
    })
    .await;

    // We only succeed if we timed out without seeing a matching message.
    assert!(result.is_err());
}

/// Wait for the server to close the socket, skipping any queued messages.
pub(crate) async fn ws_expect_closed(ws: &mut TestWs, timeout: Duration) {
    tokio::time::timeout(timeout, async {
        while ws_recv_server(ws).await.is_some() {}
    })
    .await
    .unwrap();
}
