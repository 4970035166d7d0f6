use crate::error::InventoryError;
use crate::state::AppState;
use axum::Router;

pub mod auth;
pub mod dashboard;
pub mod export;
pub mod profit;
pub mod project;
pub mod stock;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(project::router())
        .merge(stock::router())
        .merge(profit::router())
        .merge(dashboard::router())
        .merge(export::router())
}

/// Answers a known API path hit with a method it does not serve.
pub(crate) async fn method_not_allowed() -> InventoryError {
    InventoryError::MethodNotAllowed
}
