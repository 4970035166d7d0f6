use super::method_not_allowed;
use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/profits",
            get(commands::profit::get_profit_list)
                .post(commands::profit::create_profit_record)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/profits/:id",
            put(commands::profit::update_profit_record)
                .delete(commands::profit::delete_profit_record)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/analytics/profit",
            get(commands::profit::get_profit_metrics).fallback(method_not_allowed),
        )
}
