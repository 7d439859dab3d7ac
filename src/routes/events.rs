use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::events::ChangeFeed;

/// GET /events - SSE feed over the store's change-notification hook. The UI
/// refresh path consumes this to learn "some record changed".
pub async fn change_events(
    State(feed): State<ChangeFeed>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = feed.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    if let Ok(data) = serde_json::to_string(&change) {
                        yield Ok(Event::default().event("change").data(data));
                    }
                }
                // Lagged subscribers skip missed events and keep listening
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
