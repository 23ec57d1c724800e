//! SSE feed of new notifications.
//!
//! GET /api/notifications/stream?token=JWT
//!
//! EventSource can't send custom headers, so the token may be passed as a
//! `?token=` query param; the Authorization header is used otherwise.
//! Only notifications addressed to the caller or broadcast are forwarded.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::common::{ApiError, UserId};
use crate::kernel::stream_hub::{StreamEvent, NOTIFICATIONS_TOPIC};
use crate::server::app::AppState;
use crate::server::middleware::{auth_user_from_token, bearer_token};

#[derive(Deserialize)]
pub struct StreamQuery {
    /// JWT token for authentication
    token: Option<String>,
}

pub async fn notification_stream_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers).map(str::to_string))
        .ok_or_else(ApiError::unauthorized)?;
    let user = auth_user_from_token(&token, &state.deps.jwt_service)
        .ok_or_else(ApiError::unauthorized)?;

    let rx = state.deps.stream_hub.subscribe(NOTIFICATIONS_TOPIC).await;
    let user_id = user.user_id;

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });

    let events = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if is_visible_to(&event, user_id) => Event::default()
                .event(event.kind.as_str())
                .json_data(&event)
                .ok()
                .map(Ok),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(n)) => Event::default()
                .event("lagged")
                .json_data(&serde_json::json!({"missed": n}))
                .ok()
                .map(Ok),
        }
    });

    Ok(Sse::new(connected.chain(events)).keep_alive(KeepAlive::default()))
}

/// Broadcasts (`user_id` null) reach everyone, addressed ones only their recipient
fn is_visible_to(event: &StreamEvent, user_id: UserId) -> bool {
    match event.data.get("user_id") {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(recipient)) => *recipient == user_id.to_string(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn created(data: serde_json::Value) -> StreamEvent {
        StreamEvent {
            kind: "notification_created".into(),
            data,
        }
    }

    #[test]
    fn test_broadcast_is_visible() {
        let event = created(json!({"user_id": null}));
        assert!(is_visible_to(&event, UserId::new()));
    }

    #[test]
    fn test_addressed_notification_only_reaches_recipient() {
        let recipient = UserId::new();
        let event = created(json!({"user_id": recipient.to_string()}));
        assert!(is_visible_to(&event, recipient));
        assert!(!is_visible_to(&event, UserId::new()));
    }
}
