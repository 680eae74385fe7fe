//! SSE progress stream for a generation session.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use orchestrator::ProgressEvent;

use crate::state::AppState;

/// Subscribe to a session's progress events.
///
/// Each typed publisher event becomes one named SSE event. The publisher
/// stops on its own at a terminal event, the poll ceiling, or when the
/// client disconnects and the channel closes.
pub async fn stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(session_id, "Stream subscriber connected");

    let rx = state.publisher.subscribe(&session_id);
    let stream = ReceiverStream::new(rx).map(|event| Ok(to_sse_event(&event)));

    Sse::new(stream)
}

/// Map a progress event to an SSE frame: event type + data payload.
fn to_sse_event(event: &ProgressEvent) -> Event {
    let value = serde_json::to_value(event).unwrap_or_default();
    // The enum serializes as {"event": name, "data": payload}; SSE carries
    // the name in the event field, so only the payload goes in data.
    let data = value.get("data").cloned().unwrap_or(value);

    Event::default().event(event.name()).data(data.to_string())
}
