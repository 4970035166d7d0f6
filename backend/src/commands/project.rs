use crate::commands::utility::{
    non_negative, optional_text, parse_optional_date, require_text, MessageResponse,
};
use crate::db::{DbPool, Project};
use crate::error::{InventoryError, InventoryResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInput {
    pub name: String,
    pub status: String,
    pub start_date: Option<String>,
    pub budget: Option<f64>,
    pub profit: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub budget: f64,
    pub profit: f64,
    pub description: Option<String>,
}

impl ProjectInput {
    pub fn validate(self) -> InventoryResult<ProjectDraft> {
        Ok(ProjectDraft {
            name: require_text("name", &self.name)?,
            status: require_text("status", &self.status)?,
            start_date: parse_optional_date("startDate", self.start_date.as_deref())?,
            budget: non_negative("budget", self.budget.unwrap_or(0.0))?,
            // Profit may be negative (a loss-making project).
            profit: self.profit.filter(|p| p.is_finite()).unwrap_or(0.0),
            description: optional_text(self.description),
        })
    }
}

fn not_found() -> InventoryError {
    InventoryError::NotFound("Project not found".to_string())
}

pub async fn fetch_projects(pool: &DbPool) -> InventoryResult<Vec<Project>> {
    let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at, id")
        .fetch_all(pool)
        .await?;
    Ok(projects)
}

pub async fn insert_project(pool: &DbPool, draft: ProjectDraft) -> InventoryResult<Project> {
    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (id, name, status, start_date, budget, profit, description) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(draft.name)
    .bind(draft.status)
    .bind(draft.start_date)
    .bind(draft.budget)
    .bind(draft.profit)
    .bind(draft.description)
    .fetch_one(pool)
    .await?;
    Ok(project)
}

pub async fn update_project_by_id(
    pool: &DbPool,
    id: Uuid,
    draft: ProjectDraft,
) -> InventoryResult<Option<Project>> {
    let project = sqlx::query_as::<_, Project>(
        "UPDATE projects SET name = $1, status = $2, start_date = $3, budget = $4, profit = $5, description = $6, updated_at = NOW() WHERE id = $7 RETURNING *",
    )
    .bind(draft.name)
    .bind(draft.status)
    .bind(draft.start_date)
    .bind(draft.budget)
    .bind(draft.profit)
    .bind(draft.description)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(project)
}

pub async fn delete_project_by_id(pool: &DbPool, id: Uuid) -> InventoryResult<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Axum handlers

pub async fn get_project_list(
    State(state): State<AppState>,
) -> InventoryResult<Json<Vec<Project>>> {
    let projects = fetch_projects(&state.pool).await.map_err(|e| {
        tracing::error!("Error fetching projects: {}", e);
        e
    })?;
    tracing::info!("Fetched {} projects from database", projects.len());
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProjectInput>,
) -> InventoryResult<(StatusCode, Json<Project>)> {
    let draft = input.validate()?;
    let project = insert_project(&state.pool, draft).await?;
    tracing::info!("Created project {} ({})", project.name, project.id);
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<ProjectInput>,
) -> InventoryResult<Json<Project>> {
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let draft = input.validate()?;
    let project = update_project_by_id(&state.pool, id, draft)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InventoryResult<Json<MessageResponse>> {
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    if !delete_project_by_id(&state.pool, id).await? {
        return Err(not_found());
    }
    tracing::info!("Deleted project {}", id);
    Ok(MessageResponse::new("Project deleted successfully"))
}
