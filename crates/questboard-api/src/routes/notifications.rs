//! Server-sent event stream of Session Notifier traffic.
//!
//! Each SSE event is named after the notification type and carries the
//! notification as JSON. The SSE id is the interaction version, so a
//! reconnecting client can tell which changes it has already seen.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{Router, routing::get};
use futures::{Stream, StreamExt};
use tracing::{info, instrument};
use uuid::Uuid;

use questboard_interaction::application::query_handlers;
use questboard_notifier::SessionNotification;

use crate::error::ApiError;
use crate::state::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

fn to_event(notification: &SessionNotification) -> Result<Event, axum::Error> {
    Event::default()
        .event(notification.event_type.as_str())
        .id(notification.version.to_string())
        .json_data(notification)
}

/// GET /{interaction_id}/events
#[instrument(skip(state))]
async fn stream_events(
    State(state): State<AppState>,
    Path(interaction_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    // Subscribe before the existence check so nothing committed in between
    // is missed.
    let subscription = state.notifications.subscribe(interaction_id);
    let view =
        query_handlers::get_interaction_by_id(interaction_id, &*state.event_repository).await?;

    info!(
        %interaction_id,
        version = view.version,
        subscribers = state.notifications.subscriber_count(interaction_id),
        "observer attached"
    );

    let events = subscription
        .into_stream()
        .map(|notification| to_event(&notification));

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

/// Returns the router for notification streams.
pub fn router() -> Router<AppState> {
    Router::new().route("/{interaction_id}/events", get(stream_events))
}
