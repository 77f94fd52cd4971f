//! Identity collaborator: bearer credentials in, `{identity, role}` out.
//!
//! The messaging core only depends on [`AuthUser`]; how credentials are
//! issued is not its concern.

mod login;
mod token;

use axum::{Router, routing::post};

use crate::AppState;

pub use token::{AuthKeys, AuthUser, Claims};

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login::login))
}
