use axum::{Json, debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    AppState, directory,
    directory::Role,
    error::{ApiError, ApiResult},
};

use super::AuthKeys;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginBody {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    token: String,
    role: Role,
    user_id: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    State(keys): State<AuthKeys>,
    Json(LoginBody { username, password }): Json<LoginBody>,
) -> ApiResult<Json<LoginResponse>> {
    let Some(user) = directory::find_by_username(&db_pool, &username).await? else {
        return Err(ApiError::validation("Invalid credentials"));
    };

    let matches =
        bcrypt::verify(&password, &user.password_hash).map_err(anyhow::Error::from)?;
    if !matches {
        return Err(ApiError::validation("Invalid credentials"));
    }

    let token = keys.issue(&user)?;
    info!(username = %user.username, role = %user.role, "login");

    Ok(Json(LoginResponse {
        token,
        role: user.role,
        user_id: user.id,
    }))
}
