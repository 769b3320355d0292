use super::*;

fn action(battle_id: uuid::Uuid, user: &str, skill: &str) -> serde_json::Value {
    json!({"battleId": battle_id, "action": "use_skill", "skillId": skill, "userId": user})
}

#[tokio::test]
async fn pve_skill_is_answered_by_ai_turn() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut ws = ws_connect(addr).await;
    let token = issue_token(&app, "alice");

    join(&mut ws, &app, "alice", "pve").await;
    let battle_id = expect_battle_ready(&mut ws).await;

    ws_send_typed(&mut ws, "battle_action", &token, action(battle_id, "alice", "fireball")).await;
    let msg = ws_expect_message(&mut ws, WAIT, |m| {
        matches!(m, ServerMessage::BattleUpdate { battle, .. } if battle.rounds.len() == 1)
    })
    .await;
    if let ServerMessage::BattleUpdate { battle, .. } = msg {
        assert_eq!(battle.rounds[0].actor, "alice");
        // Normal AI: 100 HP, fireball 35 with a zero roll
        assert_eq!(battle.participant("AI").unwrap().health, 65);
    }

    let msg = ws_expect_message(&mut ws, WAIT, |m| {
        matches!(m, ServerMessage::BattleUpdate { battle, .. } if battle.rounds.len() == 2)
    })
    .await;
    if let ServerMessage::BattleUpdate { battle, .. } = msg {
        assert_eq!(battle.rounds[1].actor, "AI");
        assert_eq!(battle.status, BattleStatus::InProgress);
    }

    server.abort();
}

#[tokio::test]
async fn skill_reuse_within_cooldown_is_rejected() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut ws = ws_connect(addr).await;
    let token = issue_token(&app, "alice");

    join(&mut ws, &app, "alice", "pve").await;
    let battle_id = expect_battle_ready(&mut ws).await;

    ws_send_typed(&mut ws, "battle_action", &token, action(battle_id, "alice", "fireball")).await;
    ws_send_typed(&mut ws, "battle_action", &token, action(battle_id, "alice", "fireball")).await;
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Skill on cooldown");

    let snapshot = app
        .use_cases
        .arena
        .battle
        .snapshot(BattleId::from_uuid(battle_id))
        .unwrap();
    let alice_rounds = snapshot.rounds.iter().filter(|r| r.actor == "alice").count();
    assert_eq!(alice_rounds, 1);

    server.abort();
}

#[tokio::test]
async fn unknown_battle_and_unknown_skill_are_reported() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut ws = ws_connect(addr).await;
    let token = issue_token(&app, "alice");

    ws_send_typed(&mut ws, "get_battle_state", &token, json!({"battleId": "nope"})).await;
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Battle not found");

    join(&mut ws, &app, "alice", "pve").await;
    let battle_id = expect_battle_ready(&mut ws).await;
    ws_send_typed(&mut ws, "battle_action", &token, action(battle_id, "alice", "meteor")).await;
    let msg = ws_expect_message(&mut ws, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Unknown skill: meteor");

    server.abort();
}

#[tokio::test]
async fn get_battle_state_replies_with_snapshot() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut alice = ws_connect(addr).await;
    let mut observer = ws_connect(addr).await;

    join(&mut alice, &app, "alice", "pve").await;
    let battle_id = expect_battle_ready(&mut alice).await;

    ws_send_typed(
        &mut observer,
        "get_battle_state",
        &issue_token(&app, "carol"),
        json!({"battleId": battle_id}),
    )
    .await;
    let msg = ws_expect_message(&mut observer, WAIT, |_| true).await;
    match msg {
        ServerMessage::BattleUpdate { battle_id: id, battle } => {
            assert_eq!(id, battle_id);
            assert_eq!(battle.participants.len(), 2);
        }
        other => panic!("expected battle_update, got {other:?}"),
    }

    server.abort();
}

#[tokio::test]
async fn chat_reaches_both_participants_only() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut alice = ws_connect(addr).await;
    let mut bob = ws_connect(addr).await;
    let mut carol = ws_connect(addr).await;

    join(&mut alice, &app, "alice", "pvp").await;
    ws_expect_message(&mut alice, WAIT, |m| matches!(m, ServerMessage::Matchmaking { .. })).await;
    join(&mut bob, &app, "bob", "pvp").await;
    let battle_id = expect_battle_ready(&mut bob).await;
    expect_battle_ready(&mut alice).await;

    ws_send_typed(
        &mut alice,
        "chat_message",
        &issue_token(&app, "alice"),
        json!({"battleId": battle_id, "username": "Alice", "message": "gl hf", "userId": "alice"}),
    )
    .await;
    for ws in [&mut alice, &mut bob] {
        let msg = ws_expect_message(ws, WAIT, |m| matches!(m, ServerMessage::ChatMessage { .. })).await;
        match msg {
            ServerMessage::ChatMessage {
                battle_id: id,
                username,
                message,
                ..
            } => {
                assert_eq!(id, battle_id);
                assert_eq!(username, "Alice");
                assert_eq!(message, "gl hf");
            }
            other => panic!("expected chat_message, got {other:?}"),
        }
    }

    ws_send_typed(
        &mut carol,
        "chat_message",
        &issue_token(&app, "carol"),
        json!({"battleId": battle_id, "username": "Carol", "message": "hi", "userId": "carol"}),
    )
    .await;
    let msg = ws_expect_message(&mut carol, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Not a participant in this battle");
    ws_expect_no_message_matching(&mut bob, Duration::from_millis(200), |m| {
        matches!(m, ServerMessage::ChatMessage { .. })
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn leave_arena_forfeits_running_battle() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut ws = ws_connect(addr).await;

    join(&mut ws, &app, "alice", "pve").await;
    let battle_id = expect_battle_ready(&mut ws).await;

    ws_send_typed(&mut ws, "leave_arena", &issue_token(&app, "alice"), json!({"userId": "alice"})).await;
    ws_send(&mut ws, json!({"type": "ping"})).await;
    ws_expect_message(&mut ws, WAIT, |m| *m == ServerMessage::Pong).await;

    let snapshot = app
        .use_cases
        .arena
        .battle
        .snapshot(BattleId::from_uuid(battle_id))
        .unwrap();
    assert_eq!(snapshot.status, BattleStatus::Finished);
    assert_eq!(snapshot.winner.as_deref(), Some("AI"));
    assert!(app.connections.is_empty());

    server.abort();
}
