use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{State, WebSocketUpgrade, ws::WebSocket},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tracing::debug;

use crate::AppState;

use super::{ClientEvent, ConnectionId, Relay};

#[debug_handler(state = AppState)]
pub(crate) async fn relay_ws(
    State(relay): State<Arc<Relay>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |stream| handle_socket(stream, relay))
}

async fn handle_socket(stream: WebSocket, relay: Arc<Relay>) {
    let (mut sender, mut receiver) = stream.split();
    let (tx, mut rx) = relay.channel();

    let forward_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(payload) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(payload.into()).await.is_err() {
                break;
            }
        }
    });

    // one identity channel per connection; a re-join moves the subscription
    let mut joined: Option<(String, ConnectionId)> = None;

    while let Some(Ok(frame)) = receiver.next().await {
        let Ok(event) = serde_json::from_slice::<ClientEvent>(&frame.into_data()) else {
            continue;
        };

        match event {
            ClientEvent::Join { user_id } => {
                if let Some((identity, conn)) = joined.take() {
                    relay.leave(&identity, conn);
                }
                let conn = relay.join(&user_id, tx.clone());
                joined = Some((user_id, conn));
            }
            ClientEvent::Typing {
                to_user_id,
                from_user_id,
            } => {
                relay.typing(&from_user_id, &to_user_id).await;
            }
        }
    }

    if let Some((identity, conn)) = joined {
        relay.leave(&identity, conn);
        debug!(identity, "relay socket closed");
    }
    forward_task.abort();
}
