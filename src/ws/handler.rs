//! WebSocket upgrade handler and per-connection relay glue

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::relay::{RoomCmd, RoomHandle};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Outbound queue depth per connection
const OUTBOUND_QUEUE_DEPTH: usize = 64;

/// Room id used when a client omits one
const DEFAULT_ROOM: &str = "default";

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    info!(conn_id = %conn_id, "new WebSocket connection");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Writer task: relay events -> WebSocket
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMsg>(OUTBOUND_QUEUE_DEPTH);
    let writer_conn_id = conn_id;
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(conn_id = %writer_conn_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader loop: WebSocket -> room task. Membership is per-connection
    // state; game events arriving before joinRoom are dropped.
    let mut room: Option<RoomHandle> = None;

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMsg>(&text) {
                Ok(msg) => {
                    dispatch(&state, conn_id, &mut room, &out_tx, msg).await;
                }
                Err(e) => {
                    warn!(conn_id = %conn_id, error = %e, "failed to parse client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "client initiated close");
                break;
            }
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Leave current room on disconnect
    if let Some(room) = room {
        room.send(RoomCmd::Leave { conn_id }).await;
    }

    writer_handle.abort();
    info!(conn_id = %conn_id, "WebSocket connection closed");
}

/// Route a parsed client message to the connection's room
async fn dispatch(
    state: &AppState,
    conn_id: Uuid,
    room: &mut Option<RoomHandle>,
    out_tx: &mpsc::Sender<ServerMsg>,
    msg: ClientMsg,
) {
    match msg {
        ClientMsg::JoinRoom { room: room_id, name } => {
            if room.is_some() {
                debug!(conn_id = %conn_id, "duplicate joinRoom ignored");
                return;
            }

            let room_id = room_id
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_ROOM.to_string());
            let name = name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Player_{}", &conn_id.to_string()[..8]));

            let handle = state
                .rooms
                .join(&room_id, conn_id, name, out_tx.clone())
                .await;
            *room = Some(handle);
        }

        // Game events before joining a room are protocol misuse; drop them
        // without notifying the client.
        _ if room.is_none() => {
            debug!(conn_id = %conn_id, "event before joinRoom dropped");
        }

        ClientMsg::Pos { x, y, rot, hp } => {
            forward(room, RoomCmd::Position { conn_id, x, y, rot, hp }).await;
        }
        ClientMsg::Shoot { x, y, angle, weapon } => {
            forward(
                room,
                RoomCmd::Shoot {
                    conn_id,
                    x,
                    y,
                    angle,
                    weapon,
                },
            )
            .await;
        }
        ClientMsg::Hit { target_id, damage } => {
            forward(
                room,
                RoomCmd::Hit {
                    conn_id,
                    target_id,
                    damage,
                },
            )
            .await;
        }
        ClientMsg::Died => {
            forward(room, RoomCmd::Died { conn_id }).await;
        }
    }
}

async fn forward(room: &Option<RoomHandle>, cmd: RoomCmd) {
    if let Some(handle) = room {
        if !handle.send(cmd).await {
            debug!(room = %handle.room_id, "room task gone, event dropped");
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
