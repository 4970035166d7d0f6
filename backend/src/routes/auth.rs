use super::method_not_allowed;
use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/login",
            post(commands::auth::login).fallback(method_not_allowed),
        )
        .route(
            "/api/auth/check",
            get(commands::auth::check_auth_status).fallback(method_not_allowed),
        )
}
