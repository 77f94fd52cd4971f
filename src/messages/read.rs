use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use sqlx::SqlitePool;

use crate::{AppState, auth::AuthUser, directory, error::ApiResult, store};

use super::{EnrichedMessage, MessageEnvelope};

#[debug_handler(state = AppState)]
pub(crate) async fn mark_read(
    State(db_pool): State<SqlitePool>,
    Path(id): Path<String>,
    auth: AuthUser,
) -> ApiResult<Json<MessageEnvelope>> {
    auth.require_participant()?;

    let msg = store::mark_read(&db_pool, &id).await?;

    let from = directory::party(&db_pool, &msg.from_id).await?;
    let to = directory::party(&db_pool, &msg.to_id).await?;

    Ok(Json(MessageEnvelope {
        message: EnrichedMessage::assemble(msg, from, to),
    }))
}
