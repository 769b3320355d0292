use super::*;
use questarena_domain::UserId;

#[tokio::test]
async fn new_connection_supersedes_old_one_without_forfeit() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut first = ws_connect(addr).await;
    let mut second = ws_connect(addr).await;
    let mut bob = ws_connect(addr).await;

    join(&mut first, &app, "alice", "pvp").await;
    ws_expect_message(&mut first, WAIT, |m| matches!(m, ServerMessage::Matchmaking { .. })).await;

    // Same user from another socket: keeps the queue slot, closes the old socket.
    join(&mut second, &app, "alice", "pvp").await;
    let msg = ws_expect_message(&mut second, WAIT, |_| true).await;
    assert!(matches!(
        msg,
        ServerMessage::Matchmaking { queue_position: 1, .. }
    ));
    ws_expect_closed(&mut first, WAIT).await;

    // The superseded socket's cleanup must not evict the new binding.
    ws_send(&mut second, json!({"type": "ping"})).await;
    ws_expect_message(&mut second, WAIT, |m| *m == ServerMessage::Pong).await;
    assert_eq!(app.connections.len(), 1);
    assert!(app.connections.lookup(&UserId::new("alice")).is_some());

    join(&mut bob, &app, "bob", "pvp").await;
    let alice_battle = expect_battle_ready(&mut second).await;
    let bob_battle = expect_battle_ready(&mut bob).await;
    assert_eq!(alice_battle, bob_battle);

    server.abort();
}

#[tokio::test]
async fn action_from_unbound_socket_is_answered_directly() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut bound = ws_connect(addr).await;
    let mut side = ws_connect(addr).await;
    let token = issue_token(&app, "alice");

    join(&mut bound, &app, "alice", "pve").await;
    let battle_id = expect_battle_ready(&mut bound).await;

    ws_send_typed(
        &mut side,
        "battle_action",
        &token,
        json!({"battleId": battle_id, "action": "forfeit", "userId": "alice"}),
    )
    .await;
    let msg = ws_expect_message(&mut side, WAIT, |_| true).await;
    match msg {
        ServerMessage::BattleUpdate { battle, .. } => {
            assert_eq!(battle.status, BattleStatus::Finished);
            assert_eq!(battle.winner.as_deref(), Some("AI"));
        }
        other => panic!("expected battle_update, got {other:?}"),
    }

    // The bound socket hears about it through the broadcast.
    ws_expect_message(&mut bound, WAIT, |m| {
        matches!(m, ServerMessage::BattleUpdate { battle, .. } if battle.status == BattleStatus::Finished)
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn leave_from_other_socket_keeps_bound_socket_subscribed() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut bound = ws_connect(addr).await;
    let mut side = ws_connect(addr).await;
    let token = issue_token(&app, "alice");

    join(&mut bound, &app, "alice", "pve").await;
    let battle_id = expect_battle_ready(&mut bound).await;

    ws_send_typed(&mut side, "leave_arena", &token, json!({"userId": "alice"})).await;
    ws_send(&mut side, json!({"type": "ping"})).await;
    ws_expect_message(&mut side, WAIT, |m| *m == ServerMessage::Pong).await;

    // The forfeit still reaches the socket that owns the binding.
    ws_expect_message(&mut bound, WAIT, |m| {
        matches!(m, ServerMessage::BattleUpdate { battle, .. }
            if battle.id == battle_id && battle.status == BattleStatus::Finished)
    })
    .await;
    assert!(app.connections.lookup(&UserId::new("alice")).is_some());

    server.abort();
}
