use std::sync::Arc;

use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    AppState, directory,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    relay::Relay,
    store,
};

use super::{EnrichedMessage, MessageEnvelope};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageBody {
    to_user_id: Option<String>,
    text: Option<String>,
    student_id: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_message(
    State(db_pool): State<SqlitePool>,
    State(relay): State<Arc<Relay>>,
    auth: AuthUser,
    Json(body): Json<SendMessageBody>,
) -> ApiResult<Json<MessageEnvelope>> {
    auth.require_participant()?;

    // resolve the recipient before persisting anything
    let to = match body.to_user_id.as_deref() {
        None | Some("") => return Err(ApiError::validation("toUserId is required")),
        Some(id) => directory::party(&db_pool, id).await?,
    };

    let msg = store::create(
        &db_pool,
        &auth.identity,
        &to.id,
        body.text.as_deref().unwrap_or(""),
        body.student_id.as_deref(),
    )
    .await?;

    let enriched = EnrichedMessage::assemble(msg, auth.party(), to);

    debug!(from = %enriched.from.id, to = %enriched.to.id, id = %enriched.id, "message sent");
    relay.push_message(&enriched).await;

    Ok(Json(MessageEnvelope { message: enriched }))
}
