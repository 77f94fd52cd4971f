//! Live delivery relay.
//!
//! Every connected client subscribes to the channel named by its own
//! identity, so a user's channel carries pushes for *all* of their
//! conversations; sorting events into the open thread happens client-side
//! (see [`crate::client`]). Delivery is best-effort and at-most-once per
//! connected subscriber: nothing is queued for absent clients, they catch up
//! by refetching history.

mod events;
mod ws;

use std::sync::atomic::{AtomicU64, Ordering};

use axum::{Router, routing::get};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{AppState, messages::EnrichedMessage};

pub use events::{ClientEvent, ServerEvent};

/// Per-connection send buffer.
const CONNECTION_BUFFER: usize = 64;

pub type ConnectionId = u64;
type Sender = mpsc::Sender<ServerEvent>;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws::relay_ws))
}

pub struct Relay {
    channels: DashMap<String, Vec<(ConnectionId, Sender)>>,
    next_id: AtomicU64,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn channel(&self) -> (Sender, mpsc::Receiver<ServerEvent>) {
        mpsc::channel(CONNECTION_BUFFER)
    }

    /// Subscribe a connection to an identity channel.
    pub fn join(&self, identity: &str, tx: Sender) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.channels
            .entry(identity.to_owned())
            .or_default()
            .push((id, tx));
        debug!(identity, connection = id, "joined channel");
        id
    }

    pub fn leave(&self, identity: &str, connection: ConnectionId) {
        if let Some(mut conns) = self.channels.get_mut(identity) {
            conns.retain(|(id, _)| *id != connection);
        }
        self.channels.remove_if(identity, |_, conns| conns.is_empty());
        debug!(identity, connection, "left channel");
    }

    /// Fan an event out to every current subscriber of `channel`. Sends to
    /// closed connections are dropped; the subscriber recovers by refetching.
    pub async fn publish(&self, channel: &str, event: ServerEvent) {
        // snapshot the membership so no map lock is held across awaits
        let subscribers: Vec<Sender> = match self.channels.get(channel) {
            Some(conns) => conns.iter().map(|(_, tx)| tx.clone()).collect(),
            None => return,
        };

        for tx in subscribers {
            if tx.send(event.clone()).await.is_err() {
                warn!(channel, "dropped event for a closed connection");
            }
        }
    }

    /// Push a created message to both participants' channels, so the
    /// recipient and the sender's other sessions all observe it without a
    /// follow-up fetch.
    pub async fn push_message(&self, message: &EnrichedMessage) {
        self.publish(
            &message.from.id,
            ServerEvent::Message {
                message: message.clone(),
            },
        )
        .await;

        if message.to.id != message.from.id {
            self.publish(
                &message.to.id,
                ServerEvent::Message {
                    message: message.clone(),
                },
            )
            .await;
        }
    }

    pub async fn typing(&self, from: &str, to: &str) {
        self.publish(
            to,
            ServerEvent::UserTyping {
                from_user_id: from.to_owned(),
            },
        )
        .await;
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
