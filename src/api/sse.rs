use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;

use crate::infrastructure::app_state::AppState;

#[derive(Deserialize)]
pub struct SseParams {
    token: Option<String>,
}

/// GET /api/events?token= - Notification stream of the authenticated user
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SseParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    // EventSource cannot send headers, so the token travels in the query
    let claims = params
        .token
        .and_then(|token| state.jwt_service.verify(&token).ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = claims.user_id;
    let mut receiver = state.event_sender.new_receiver();

    let stream = async_stream::stream! {
        tracing::debug!(user_id = %user_id, "SSE stream started");

        // Send initial connected event
        yield Ok::<_, Infallible>(Event::default()
            .event("connected")
            .data(serde_json::json!({
                "userId": user_id,
                "timestamp": chrono::Utc::now().timestamp_millis()
            }).to_string()));

        let mut heartbeat_interval = tokio::time::interval(Duration::from_secs(20));

        loop {
            tokio::select! {
                _ = heartbeat_interval.tick() => {
                    tracing::trace!("SSE heartbeat");
                    yield Ok(Event::default().comment("heartbeat"));
                }
                result = receiver.recv() => {
                    match result {
                        Ok(event) if event.user_id == user_id => {
                            match serde_json::to_string(&event) {
                                Ok(json) => yield Ok(Event::default().event(event.kind.as_str()).data(json)),
                                Err(e) => tracing::warn!(error = %e, "Failed to serialize notification"),
                            }
                        }
                        Ok(_) => {}
                        Err(async_broadcast::RecvError::Overflowed(skipped)) => {
                            tracing::warn!(user_id = %user_id, skipped, "SSE receiver lagged, events dropped");
                        }
                        Err(e) => {
                            tracing::warn!("SSE receiver error: {:?}, closing stream", e);
                            break;
                        }
                    }
                }
            }
        }

        tracing::debug!(user_id = %user_id, "SSE stream closed");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
