//! The websocket endpoint: split the socket, spawn a send task draining an
//! `mpsc` channel, and loop on incoming text frames in the same task that
//! owns the receiver half. There's no connection-level auth step —
//! `user-connect` is itself the first in-band message.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::hub::Hub;
use crate::protocol::{
    client_event, ChallengeIdPayload, ClientEnvelope, CreateRoomPayload, JoinRoomPayload,
    MakeMovePayload, RoomCodePayload, SendChallengePayload, StartGamePayload, UserConnectPayload,
};

pub async fn websocket_handler(ws: WebSocketUpgrade, State(hub): State<Arc<Hub>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let conn_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    hub.register_connection(conn_id.clone(), tx);

    let send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    info!(conn_id, "connection opened");
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => dispatch(&hub, &conn_id, &text),
            Message::Close(_) => break,
            _ => {}
        }
    }
    info!(conn_id, "connection closed");

    hub.disconnect(&conn_id);
    send_task.abort();
}

fn dispatch(hub: &Arc<Hub>, conn_id: &str, text: &str) {
    let envelope: ClientEnvelope = match serde_json::from_str(text) {
        Ok(e) => e,
        Err(e) => {
            warn!(conn_id, error = %e, "malformed envelope");
            return;
        }
    };
    let conn_id = conn_id.to_string();
    debug!(conn_id, event = %envelope.event, "dispatching");

    macro_rules! decode {
        ($ty:ty) => {
            match serde_json::from_value::<$ty>(envelope.payload) {
                Ok(p) => p,
                Err(e) => {
                    warn!(conn_id, event = %envelope.event, error = %e, "bad payload");
                    return;
                }
            }
        };
    }

    match envelope.event.as_str() {
        client_event::USER_CONNECT => {
            let p = decode!(UserConnectPayload);
            hub.user_connect(&conn_id, p.name);
        }
        client_event::CREATE_ROOM => {
            let p = decode!(CreateRoomPayload);
            hub.create_room(&conn_id, p.game_type, p.player_name);
        }
        client_event::JOIN_ROOM => {
            let p = decode!(JoinRoomPayload);
            hub.join_room(&conn_id, p.room_code, p.player_name);
        }
        client_event::START_GAME => {
            let p = decode!(StartGamePayload);
            hub.start_game(&conn_id, p.room_code, p.ai_count);
        }
        client_event::MAKE_MOVE => {
            let p = decode!(MakeMovePayload);
            hub.make_move(&conn_id, p.room_code, p.mv);
        }
        client_event::REQUEST_STATE => {
            let p = decode!(RoomCodePayload);
            hub.request_state(&conn_id, p.room_code);
        }
        client_event::REQUEST_REMATCH => {
            let p = decode!(RoomCodePayload);
            hub.request_rematch(&conn_id, p.room_code);
        }
        client_event::SEND_CHALLENGE => {
            let p = decode!(SendChallengePayload);
            hub.send_challenge(&conn_id, p.to_id, p.game_type);
        }
        client_event::ACCEPT_CHALLENGE => {
            let p = decode!(ChallengeIdPayload);
            hub.accept_challenge(&conn_id, p.challenge_id);
        }
        client_event::DECLINE_CHALLENGE => {
            let p = decode!(ChallengeIdPayload);
            hub.decline_challenge(&conn_id, p.challenge_id);
        }
        other => {
            warn!(conn_id, event = other, "unknown event");
        }
    }
}
