use super::method_not_allowed;
use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/export/full",
            get(commands::export::export_full_report).fallback(method_not_allowed),
        )
        .route(
            "/api/export/profits",
            get(commands::export::export_profit_report).fallback(method_not_allowed),
        )
}
