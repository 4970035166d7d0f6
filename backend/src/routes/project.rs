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
            "/api/projects",
            get(commands::project::get_project_list)
                .post(commands::project::create_project)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/projects/:id",
            put(commands::project::update_project)
                .delete(commands::project::delete_project)
                .fallback(method_not_allowed),
        )
}
