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
            "/api/stock",
            get(commands::stock::get_stock_list)
                .post(commands::stock::create_stock_item)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/stock/alerts",
            get(commands::stock::get_stock_alerts).fallback(method_not_allowed),
        )
        .route(
            "/api/stock/:id",
            put(commands::stock::update_stock_item)
                .delete(commands::stock::delete_stock_item)
                .fallback(method_not_allowed),
        )
}
