//! Conversation service: direct messages between a parent and a teacher.

mod conversation;
mod read;
mod send;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, directory::Party, store};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send::send_message))
        .route("/conversation/{counterpart}", get(conversation::conversation))
        .route("/read/{id}", put(read::mark_read))
}

/// A persisted message joined with display info for both parties. The only
/// message shape that leaves the server, over HTTP or the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMessage {
    pub id: String,
    pub from: Party,
    pub to: Party,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub created_at: i64,
    pub read: bool,
}

impl EnrichedMessage {
    pub(crate) fn assemble(msg: store::Message, from: Party, to: Party) -> Self {
        Self {
            id: msg.id,
            from,
            to,
            text: msg.body,
            student_id: msg.student_id,
            created_at: msg.created_at,
            read: msg.read,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageEnvelope {
    pub message: EnrichedMessage,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConversationEnvelope {
    pub messages: Vec<EnrichedMessage>,
}
