use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use storelink_core::canvas::{ClientMessage, OnboardingFlow, Schedule};

use crate::state::AppState;
use crate::ws::manager::{ConnectionHandle, WsManager};
use crate::ws::scheduler::spawn_schedule;

/// How long the sender task may take to flush after the connection ends.
const SEND_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP handler that upgrades the connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Plays the opening schedule.
///   4. Feeds inbound messages to the connection's `OnboardingFlow`.
///   5. Cancels pending schedules and cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let (handle, mut rx) = ws_manager.add(conn_id.clone()).await;
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let mut flow = OnboardingFlow::new();
    dispatch(&handle, flow.start());

    loop {
        let result = tokio::select! {
            _ = handle.cancel.cancelled() => break,
            next = stream.next() => match next {
                Some(result) => result,
                None => break,
            },
        };

        match result {
            Ok(Message::Text(text)) => match ClientMessage::parse(text.as_str()) {
                Ok(message) => {
                    tracing::debug!(conn_id = %conn_id, kind = message.kind(), "Client message");
                    dispatch(&handle, flow.handle(&message));
                }
                Err(e) => {
                    tracing::warn!(conn_id = %conn_id, error = %e, "Ignoring client message");
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

    // Cancels every schedule still running for this connection.
    ws_manager.remove(&conn_id).await;
    handle.cancel.cancel();
    drop(handle);

    let mut send_task = send_task;
    if tokio::time::timeout(SEND_DRAIN_TIMEOUT, &mut send_task).await.is_err() {
        send_task.abort();
    }
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

fn dispatch(handle: &ConnectionHandle, schedule: Schedule) {
    if schedule.is_empty() {
        return;
    }
    spawn_schedule(schedule, handle.sender.clone(), handle.cancel.clone());
}
