use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, directory,
    directory::{Party, Role, UserRecord},
    error::{ApiError, ApiResult},
};

const TOKEN_TTL: time::Duration = time::Duration::days(7);

#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user: &UserRecord) -> ApiResult<String> {
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            exp: (time::OffsetDateTime::now_utc() + TOKEN_TTL).unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| ApiError::Internal(err.into()))
    }

    fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Ok(decode::<Claims>(token, &self.decoding, &Validation::default())?.claims)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
}

/// The authenticated caller, resolved from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: String,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_participant(&self) -> Result<(), ApiError> {
        if self.role.is_participant() {
            Ok(())
        } else {
            Err(ApiError::forbidden("insufficient permissions"))
        }
    }

    pub fn party(&self) -> Party {
        Party {
            id: self.identity.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("No token"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("No token"))?;

        let claims = state
            .auth_keys
            .verify(token)
            .map_err(|_| ApiError::unauthorized("Invalid token"))?;

        // a token for a since-removed account is no longer valid
        let user = directory::find_by_id(&state.db_pool, &claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

        Ok(AuthUser {
            identity: user.id,
            username: user.username,
            role: user.role,
        })
    }
}
