use chrono::Utc;
use circle_pipeline::events::{PendingJob, RosterEntry};
use circle_pipeline::{Emitter, Participant, WireEvent};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::messages::ClientMessage;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// managed by two tasks (sender + receiver).
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound messages on the current task.
///   4. Cleans up on disconnect (room leave + roster broadcast).
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state.ws_manager.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: dispatch inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(&state, &conn_id, msg).await,
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "Unparseable client message");
                    state
                        .ws_manager
                        .emit(
                            &conn_id,
                            WireEvent::Error {
                                message: "Unrecognized message".to_string(),
                            },
                        )
                        .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection, leave rooms, abort sender task.
    // In-flight dub pollers are left running; their final delivery to
    // this connection becomes a no-op.
    state.ws_manager.remove(&conn_id).await;
    let affected_rooms = state.registry.leave(&conn_id).await;
    for room_id in affected_rooms {
        let roster = state.registry.roster(&room_id).await;
        broadcast_roster_update(&state, &roster, WireEvent::UserLeft {
            users: roster_entries(&roster),
        })
        .await;
    }
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Dispatch one parsed client message.
async fn handle_client_message(state: &AppState, conn_id: &str, msg: ClientMessage) {
    match msg {
        ClientMessage::JoinCircle {
            room_id,
            username,
            language,
        } => handle_join(state, conn_id, &room_id, &username, &language).await,

        ClientMessage::AudioData {
            room_id,
            audio,
            format,
        } => {
            state.dispatcher.route(&room_id, conn_id, &audio, &format).await;
        }

        ClientMessage::SendMessage { message } => {
            handle_send_message(state, conn_id, &message).await;
        }

        ClientMessage::Typing { typing } => handle_typing(state, conn_id, typing).await,

        ClientMessage::SetLanguage { language } => {
            state.registry.set_language(conn_id, &language).await;
            tracing::debug!(conn_id, language, "Listener language changed");
        }

        ClientMessage::GetPendingJobs => handle_get_pending_jobs(state, conn_id).await,
    }
}

async fn handle_join(
    state: &AppState,
    conn_id: &str,
    room_id: &str,
    username: &str,
    language: &str,
) {
    let participant = state.registry.join(room_id, conn_id, username, language).await;
    tracing::info!(
        conn_id,
        room_id,
        username = %participant.username,
        language,
        "Participant joined room",
    );

    // Replay recent chat to the joiner only.
    let history = state.chat.recent(room_id).await;
    if !history.is_empty() {
        state
            .ws_manager
            .emit(conn_id, WireEvent::ChatHistory { messages: history })
            .await;
    }

    let roster = state.registry.roster(room_id).await;
    broadcast_roster_update(
        state,
        &roster,
        WireEvent::UserJoined {
            username: username.to_string(),
            language: language.to_string(),
            users: roster_entries(&roster),
        },
    )
    .await;
}

async fn handle_send_message(state: &AppState, conn_id: &str, message: &str) {
    let Some(session) = state.registry.session(conn_id).await else {
        emit_error(state, conn_id, "User not authenticated").await;
        return;
    };

    let text = message.trim();
    if text.is_empty() {
        emit_error(state, conn_id, "Message cannot be empty").await;
        return;
    }

    let chat_message = circle_pipeline::events::ChatMessage {
        id: uuid::Uuid::new_v4().to_string(),
        username: session.username.clone(),
        message: text.to_string(),
        timestamp: Utc::now(),
        language: session.language.clone(),
    };

    state.chat.append(&session.room_id, chat_message.clone()).await;

    let roster = state.registry.roster(&session.room_id).await;
    broadcast_roster_update(
        state,
        &roster,
        WireEvent::NewMessage {
            message: chat_message,
        },
    )
    .await;
}

async fn handle_typing(state: &AppState, conn_id: &str, typing: bool) {
    let Some(session) = state.registry.session(conn_id).await else {
        return;
    };

    // Everyone in the room except the typist.
    let listeners = state.registry.listeners_of(&session.room_id, conn_id).await;
    let conns: Vec<String> = listeners.into_iter().map(|p| p.conn).collect();
    state
        .ws_manager
        .emit_many(
            &conns,
            WireEvent::UserTyping {
                username: session.username,
                typing,
            },
        )
        .await;
}

async fn handle_get_pending_jobs(state: &AppState, conn_id: &str) {
    if state.registry.session(conn_id).await.is_none() {
        return;
    }

    let jobs: Vec<PendingJob> = state
        .tracker
        .jobs_for(conn_id)
        .await
        .into_iter()
        .map(|job| PendingJob {
            job_id: job.job_id,
            speaker: job.speaker,
            status: job.status.as_str().to_string(),
            created_at: job.created_at,
        })
        .collect();

    state
        .ws_manager
        .emit(conn_id, WireEvent::PendingJobsList { jobs })
        .await;
}

/// Emit an event to every participant in a roster snapshot.
async fn broadcast_roster_update(state: &AppState, roster: &[Participant], event: WireEvent) {
    let conns: Vec<String> = roster.iter().map(|p| p.conn.clone()).collect();
    state.ws_manager.emit_many(&conns, event).await;
}

fn roster_entries(roster: &[Participant]) -> Vec<RosterEntry> {
    roster
        .iter()
        .map(|p| RosterEntry {
            username: p.username.clone(),
            language: p.target_language.clone(),
        })
        .collect()
}

async fn emit_error(state: &AppState, conn_id: &str, message: &str) {
    state
        .ws_manager
        .emit(
            conn_id,
            WireEvent::Error {
                message: message.to_string(),
            },
        )
        .await;
}
