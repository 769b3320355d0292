use super::*;
use crate::infrastructure::config::ArenaConfig;
use crate::infrastructure::profile_store::InMemoryProfileStore;
use questarena_domain::UserId;
use std::sync::Arc;

#[tokio::test]
async fn two_pvp_joins_are_paired_into_one_battle() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut alice = ws_connect(addr).await;
    let mut bob = ws_connect(addr).await;

    join(&mut alice, &app, "alice", "pvp").await;
    let msg = ws_expect_message(&mut alice, WAIT, |_| true).await;
    assert_eq!(
        msg,
        ServerMessage::Matchmaking {
            status: questarena_shared::MatchmakingStatus::Searching,
            queue_position: 1,
        }
    );

    join(&mut bob, &app, "bob", "pvp").await;
    let alice_battle = expect_battle_ready(&mut alice).await;
    let bob_battle = expect_battle_ready(&mut bob).await;
    assert_eq!(alice_battle, bob_battle);

    let snapshot = app
        .use_cases
        .arena
        .battle
        .snapshot(BattleId::from_uuid(alice_battle))
        .unwrap();
    assert_eq!(snapshot.status, BattleStatus::InProgress);
    // The earlier arrival takes the first seat.
    assert_eq!(snapshot.participants[0].identity, "alice");
    assert_eq!(snapshot.participants[1].identity, "bob");

    server.abort();
}

#[tokio::test]
async fn ready_handshake_starts_battle_when_both_acknowledge() {
    let config = ArenaConfig {
        pvp_ready_handshake: true,
        ..test_config()
    };
    let app = build_test_app_with(config, |_| {});
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut alice = ws_connect(addr).await;
    let mut bob = ws_connect(addr).await;

    join(&mut alice, &app, "alice", "pvp").await;
    ws_expect_message(&mut alice, WAIT, |m| matches!(m, ServerMessage::Matchmaking { .. })).await;
    join(&mut bob, &app, "bob", "pvp").await;

    let battle_id = match ws_expect_message(&mut bob, WAIT, |m| {
        matches!(m, ServerMessage::BattleReady { .. })
    })
    .await
    {
        ServerMessage::BattleReady { battle_id, battle } => {
            assert_eq!(battle.status, BattleStatus::Waiting);
            battle_id
        }
        other => panic!("expected battle_ready, got {other:?}"),
    };
    expect_battle_ready(&mut alice).await;

    // Actions are refused until both sides are ready.
    ws_send_typed(
        &mut alice,
        "battle_action",
        &issue_token(&app, "alice"),
        json!({"battleId": battle_id, "action": "use_skill", "skillId": "fireball", "userId": "alice"}),
    )
    .await;
    let msg = ws_expect_message(&mut alice, WAIT, is_error).await;
    assert_eq!(error_text(msg), "Battle is not active");

    let ready = |user: &str| json!({"battleId": battle_id, "userId": user});
    ws_send_typed(&mut alice, "battle_ready", &issue_token(&app, "alice"), ready("alice")).await;
    let msg = ws_expect_message(&mut bob, WAIT, |m| {
        matches!(m, ServerMessage::BattleUpdate { .. })
    })
    .await;
    match msg {
        ServerMessage::BattleUpdate { battle, .. } => {
            assert_eq!(battle.status, BattleStatus::Waiting);
            assert!(battle.participant("alice").unwrap().ready);
            assert!(!battle.participant("bob").unwrap().ready);
        }
        other => panic!("expected battle_update, got {other:?}"),
    }

    ws_send_typed(&mut bob, "battle_ready", &issue_token(&app, "bob"), ready("bob")).await;
    for ws in [&mut alice, &mut bob] {
        let msg = ws_expect_message(ws, WAIT, |m| {
            matches!(m, ServerMessage::BattleReady { battle, .. } if battle.status == BattleStatus::InProgress)
        })
        .await;
        assert_eq!(
            msg,
            ServerMessage::battle_ready(
                app.use_cases
                    .arena
                    .battle
                    .snapshot(BattleId::from_uuid(battle_id))
                    .unwrap()
            )
        );
    }

    server.abort();
}

#[tokio::test]
async fn disconnect_mid_battle_forfeits_to_opponent() {
    let profiles = Arc::new(InMemoryProfileStore::new());
    let store = profiles.clone();
    let app = build_test_app_with(test_config(), move |ports| ports.profiles = store);
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut alice = ws_connect(addr).await;
    let mut bob = ws_connect(addr).await;

    join(&mut alice, &app, "alice", "pvp").await;
    ws_expect_message(&mut alice, WAIT, |m| matches!(m, ServerMessage::Matchmaking { .. })).await;
    join(&mut bob, &app, "bob", "pvp").await;
    let battle_id = expect_battle_ready(&mut bob).await;
    expect_battle_ready(&mut alice).await;

    alice.close(None).await.unwrap();
    drop(alice);

    let msg = ws_expect_message(&mut bob, WAIT, |m| {
        matches!(m, ServerMessage::BattleUpdate { battle, .. } if battle.status == BattleStatus::Finished)
    })
    .await;
    match msg {
        ServerMessage::BattleUpdate { battle_id: id, battle } => {
            assert_eq!(id, battle_id);
            assert_eq!(battle.winner.as_deref(), Some("bob"));
            assert!(battle.ended_at.is_some());
        }
        other => panic!("expected battle_update, got {other:?}"),
    }

    // The outcome report runs in the background.
    tokio::time::timeout(WAIT, async {
        while profiles.record(&UserId::new("bob")).wins == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(profiles.xp(&UserId::new("bob")), 120);
    assert_eq!(profiles.record(&UserId::new("alice")).losses, 1);

    server.abort();
}

#[tokio::test]
async fn leaving_the_queue_prevents_pairing() {
    let app = build_test_app();
    let (addr, server) = spawn_ws_server(app.clone()).await;
    let mut alice = ws_connect(addr).await;
    let mut bob = ws_connect(addr).await;

    join(&mut alice, &app, "alice", "pvp").await;
    ws_expect_message(&mut alice, WAIT, |m| matches!(m, ServerMessage::Matchmaking { .. })).await;
    ws_send_typed(
        &mut alice,
        "leave_arena",
        &issue_token(&app, "alice"),
        json!({"userId": "alice"}),
    )
    .await;
    // Round trip so the leave has been processed.
    ws_send(&mut alice, json!({"type": "ping"})).await;
    ws_expect_message(&mut alice, WAIT, |m| *m == ServerMessage::Pong).await;

    join(&mut bob, &app, "bob", "pvp").await;
    let msg = ws_expect_message(&mut bob, WAIT, |_| true).await;
    assert!(matches!(
        msg,
        ServerMessage::Matchmaking { queue_position: 1, .. }
    ));
    assert!(app.battles.is_empty());

    server.abort();
}
