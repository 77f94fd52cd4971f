use serde::{Deserialize, Serialize};

use crate::messages::EnrichedMessage;

/// Client-to-server events on the relay socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Subscribe this connection to the caller's own identity channel.
    Join { user_id: String },
    /// Ephemeral typing notification for the counterpart.
    Typing {
        to_user_id: String,
        from_user_id: String,
    },
}

/// Server-to-client events pushed over an identity channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    Message { message: EnrichedMessage },
    UserTyping { from_user_id: String },
}
