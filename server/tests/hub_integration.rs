//! Integration tests for the hub dispatch layer: drive the public API the
//! way a connected client would and assert on the `(event, payload)` frames
//! it emits. There's no real socket here — `Hub`'s methods already take a
//! plain `mpsc::UnboundedSender<String>` per connection, so registering one
//! directly and draining the paired receiver gives the same observable
//! behavior a websocket client would see.

use serde_json::Value;
use std::sync::Arc;
use tablehub_server::config::HubConfig;
use tablehub_server::hub::Hub;
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn test_config() -> HubConfig {
    HubConfig::from_env(Some("127.0.0.1:0".parse().unwrap())).expect("defaults are valid")
}

fn attach(hub: &Arc<Hub>, id: &str) -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    hub.register_connection(id.to_string(), tx);
    rx
}

async fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(text) = rx.try_recv() {
        out.push(serde_json::from_str(&text).unwrap());
    }
    out
}

fn events(frames: &[Value]) -> Vec<String> {
    frames
        .iter()
        .map(|f| f["event"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn user_connect_announces_to_others() {
    let hub = Hub::new(test_config());
    let mut alice_rx = attach(&hub, "alice");
    hub.user_connect(&"alice".to_string(), "Alice".to_string());
    let alice_frames = drain(&mut alice_rx).await;
    assert_eq!(events(&alice_frames), vec!["name-accepted", "user-list"]);

    let mut bob_rx = attach(&hub, "bob");
    hub.user_connect(&"bob".to_string(), "Bob".to_string());
    let _ = drain(&mut bob_rx).await;

    let alice_frames = drain(&mut alice_rx).await;
    assert_eq!(events(&alice_frames), vec!["user-joined"]);
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    let hub = Hub::new(test_config());
    let mut a_rx = attach(&hub, "a");
    hub.user_connect(&"a".to_string(), "Dup".to_string());
    drain(&mut a_rx).await;

    let mut b_rx = attach(&hub, "b");
    hub.user_connect(&"b".to_string(), "Dup".to_string());
    let frames = drain(&mut b_rx).await;
    assert_eq!(events(&frames), vec!["name-error"]);
}

#[tokio::test]
async fn create_and_join_room_notifies_both_seats() {
    let hub = Hub::new(test_config());
    let mut host_rx = attach(&hub, "host");
    hub.user_connect(&"host".to_string(), "Host".to_string());
    drain(&mut host_rx).await;

    let game_type: tablehub_engine::GameType = serde_json::from_value(serde_json::json!("tic-tac-toe")).unwrap();
    hub.create_room(&"host".to_string(), game_type, "Host".to_string());
    let frames = drain(&mut host_rx).await;
    assert!(events(&frames).contains(&"room-created".to_string()));
    let room_code = frames
        .iter()
        .find(|f| f["event"] == "room-created")
        .unwrap()["payload"]["roomCode"]
        .as_str()
        .unwrap()
        .to_string();

    let mut guest_rx = attach(&hub, "guest");
    hub.user_connect(&"guest".to_string(), "Guest".to_string());
    drain(&mut guest_rx).await;
    drain(&mut host_rx).await;

    hub.join_room(&"guest".to_string(), room_code, "Guest".to_string());
    let host_frames = drain(&mut host_rx).await;
    let guest_frames = drain(&mut guest_rx).await;
    assert!(events(&host_frames).contains(&"player-joined".to_string()));
    assert!(events(&guest_frames).contains(&"player-joined".to_string()));
}

#[tokio::test]
async fn join_unknown_room_reports_join_error() {
    let hub = Hub::new(test_config());
    let mut rx = attach(&hub, "solo");
    hub.user_connect(&"solo".to_string(), "Solo".to_string());
    drain(&mut rx).await;

    hub.join_room(&"solo".to_string(), "NOPE99".to_string(), "Solo".to_string());
    let frames = drain(&mut rx).await;
    assert_eq!(events(&frames), vec!["join-error"]);
}

#[tokio::test]
async fn disconnect_cancels_pending_challenge() {
    let hub = Hub::new(test_config());
    let mut a_rx = attach(&hub, "a");
    let mut b_rx = attach(&hub, "b");
    hub.user_connect(&"a".to_string(), "A".to_string());
    hub.user_connect(&"b".to_string(), "B".to_string());
    drain(&mut a_rx).await;
    drain(&mut b_rx).await;

    let game_type: tablehub_engine::GameType = serde_json::from_value(serde_json::json!("checkers")).unwrap();
    hub.send_challenge(&"a".to_string(), "b".to_string(), game_type);
    let frames = drain(&mut b_rx).await;
    assert_eq!(events(&frames), vec!["challenge-received"]);

    let challenge_id = frames[0]["payload"]["challengeId"].as_str().unwrap().to_string();
    hub.disconnect(&"a".to_string());
    drain(&mut b_rx).await; // the "user-left" broadcast from a's disconnect

    // Accepting a now-cancelled challenge should be a silent no-op: no room
    // gets created and no further frames are sent to b.
    hub.accept_challenge(&"b".to_string(), challenge_id);
    let frames = drain(&mut b_rx).await;
    assert!(frames.is_empty());
}
