//! Plays a [`Schedule`] onto one connection's outbound channel.
//!
//! Delays are offsets from the moment the schedule is dispatched, not from
//! the previous message. A cancelled token or a closed channel ends the
//! playback; undelivered messages are dropped.

use axum::extract::ws::Message;
use storelink_core::canvas::Schedule;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::manager::WsSender;

/// Spawn a task delivering `schedule` through `sender`.
///
/// The task resolves to the number of messages actually handed to the
/// channel.
pub fn spawn_schedule(
    schedule: Schedule,
    sender: WsSender,
    cancel: CancellationToken,
) -> JoinHandle<usize> {
    let started = Instant::now();

    tokio::spawn(async move {
        let mut delivered = 0;
        for item in schedule.into_delivery_order() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(delivered, "Schedule cancelled");
                    break;
                }
                _ = sleep_until(started + item.delay) => {}
            }

            let text = match item.message.to_text() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(kind = item.message.kind(), error = %e, "Failed to encode message");
                    continue;
                }
            };

            if sender.send(Message::Text(text.into())).is_err() {
                tracing::debug!(delivered, "Connection closed before schedule finished");
                break;
            }
            delivered += 1;
        }

        delivered
    })
}
