use std::collections::HashMap;

use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use sqlx::SqlitePool;

use crate::{AppState, auth::AuthUser, directory, directory::Party, error::ApiResult, store};

use super::{ConversationEnvelope, EnrichedMessage};

/// Full history between the caller and a counterpart, oldest first. Either
/// participant may ask, regardless of who wrote first; an unknown or silent
/// counterpart yields an empty list.
#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    State(db_pool): State<SqlitePool>,
    Path(counterpart): Path<String>,
    auth: AuthUser,
) -> ApiResult<Json<ConversationEnvelope>> {
    auth.require_participant()?;

    let history = store::find_conversation(&db_pool, &auth.identity, &counterpart).await?;

    // a two-party thread mentions at most two identities; look each up once
    let mut parties: HashMap<String, Party> = HashMap::new();
    for msg in &history {
        for id in [&msg.from_id, &msg.to_id] {
            if !parties.contains_key(id.as_str()) {
                parties.insert(id.clone(), directory::party(&db_pool, id).await?);
            }
        }
    }

    let messages = history
        .into_iter()
        .map(|msg| {
            let from = parties[&msg.from_id].clone();
            let to = parties[&msg.to_id].clone();
            EnrichedMessage::assemble(msg, from, to)
        })
        .collect();

    Ok(Json(ConversationEnvelope { messages }))
}
