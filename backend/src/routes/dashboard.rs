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
            "/api/analytics/dashboard",
            get(commands::dashboard::get_dashboard_analytics).fallback(method_not_allowed),
        )
        .route(
            "/api/init-sample-data",
            post(commands::utility::init_sample_data).fallback(method_not_allowed),
        )
}
