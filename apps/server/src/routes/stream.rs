//! Kitchen display SSE stream.
//!
//! ## Stream Protocol
//! ```text
//! event: HELLO            {"type":"HELLO","restaurantId":...} once, on connect
//! event: ORDER_CREATED    {"type":"ORDER_CREATED","restaurantId":...,"orderId":...}
//! event: ORDER_UPDATED    {"type":"ORDER_UPDATED",...,"status":"READY"}
//! event: PING             millisecond timestamp, every 15s (proxy keep-alive)
//! ```
//!
//! EventSource cannot set headers, so this endpoint accepts the JWT via
//! `?token=` (see [`crate::auth`]). Each connection spawns a pump task that
//! filters the process-wide bus down to the authenticated tenant. Events
//! carry ids, not order data; the display re-fetches on receipt, which also
//! makes a lagged (dropped-events) subscription harmless.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::auth::StaffAuth;
use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(15);

/// GET /api/kds/stream
pub async fn kds_stream(
    State(state): State<Arc<AppState>>,
    auth: StaffAuth,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let restaurant_id = auth.restaurant_id;
    let mut rx = state.bus.subscribe();
    let (tx, out) = mpsc::channel::<Event>(32);

    debug!(%restaurant_id, "KDS stream connected");

    tokio::spawn(async move {
        let hello = serde_json::json!({"type": "HELLO", "restaurantId": restaurant_id});
        let _ = tx
            .send(Event::default().event("HELLO").data(hello.to_string()))
            .await;

        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.tick().await; // the first tick completes immediately

        loop {
            tokio::select! {
                result = rx.recv() => match result {
                    Ok(event) => {
                        if event.restaurant_id() != restaurant_id {
                            continue;
                        }
                        let Ok(sse) = Event::default()
                            .event(event.event_name())
                            .json_data(&event)
                        else {
                            continue;
                        };
                        if tx.send(sse).await.is_err() {
                            break; // client went away
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(%restaurant_id, skipped, "KDS subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = ping.tick() => {
                    let sse = Event::default()
                        .event("PING")
                        .data(Utc::now().timestamp_millis().to_string());
                    if tx.send(sse).await.is_err() {
                        break;
                    }
                }
            }
        }

        debug!(%restaurant_id, "KDS stream disconnected");
    });

    Sse::new(ReceiverStream::new(out).map(Ok)).keep_alive(KeepAlive::default())
}
