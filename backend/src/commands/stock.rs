use crate::commands::utility::{non_negative, optional_text, require_text, MessageResponse};
use crate::db::{DbPool, StockItem, StockStatus};
use crate::error::{InventoryError, InventoryResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockInput {
    pub name: String,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub min_threshold: Option<i32>,
    pub supplier: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct StockDraft {
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub unit_price: f64,
    pub min_threshold: i32,
    pub supplier: Option<String>,
}

fn non_negative_count(field: &str, value: Option<i32>) -> InventoryResult<i32> {
    let value = value.unwrap_or(0);
    if value < 0 {
        return Err(InventoryError::Validation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(value)
}

impl StockInput {
    pub fn validate(self) -> InventoryResult<StockDraft> {
        Ok(StockDraft {
            name: require_text("name", &self.name)?,
            category: optional_text(self.category),
            quantity: non_negative_count("quantity", self.quantity)?,
            unit_price: non_negative("unitPrice", self.unit_price.unwrap_or(0.0))?,
            min_threshold: non_negative_count("minThreshold", self.min_threshold)?,
            supplier: optional_text(self.supplier),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StockAlert {
    #[serde(flatten)]
    pub item: StockItem,
    pub status: StockStatus,
}

/// Items that need attention, in store order.
pub fn stock_alerts(items: Vec<StockItem>) -> Vec<StockAlert> {
    items
        .into_iter()
        .filter_map(|item| {
            let status = item.status();
            (status != StockStatus::InStock).then_some(StockAlert { item, status })
        })
        .collect()
}

fn not_found() -> InventoryError {
    InventoryError::NotFound("Stock item not found".to_string())
}

pub async fn fetch_stock(pool: &DbPool) -> InventoryResult<Vec<StockItem>> {
    let items = sqlx::query_as::<_, StockItem>("SELECT * FROM stock ORDER BY created_at, id")
        .fetch_all(pool)
        .await?;
    Ok(items)
}

pub async fn insert_stock_item(pool: &DbPool, draft: StockDraft) -> InventoryResult<StockItem> {
    let item = sqlx::query_as::<_, StockItem>(
        "INSERT INTO stock (id, name, category, quantity, unit_price, min_threshold, supplier) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(draft.name)
    .bind(draft.category)
    .bind(draft.quantity)
    .bind(draft.unit_price)
    .bind(draft.min_threshold)
    .bind(draft.supplier)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

pub async fn update_stock_item_by_id(
    pool: &DbPool,
    id: Uuid,
    draft: StockDraft,
) -> InventoryResult<Option<StockItem>> {
    let item = sqlx::query_as::<_, StockItem>(
        "UPDATE stock SET name = $1, category = $2, quantity = $3, unit_price = $4, min_threshold = $5, supplier = $6, updated_at = NOW() WHERE id = $7 RETURNING *",
    )
    .bind(draft.name)
    .bind(draft.category)
    .bind(draft.quantity)
    .bind(draft.unit_price)
    .bind(draft.min_threshold)
    .bind(draft.supplier)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

pub async fn delete_stock_item_by_id(pool: &DbPool, id: Uuid) -> InventoryResult<bool> {
    let result = sqlx::query("DELETE FROM stock WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Axum handlers

pub async fn get_stock_list(State(state): State<AppState>) -> InventoryResult<Json<Vec<StockItem>>> {
    let items = fetch_stock(&state.pool).await.map_err(|e| {
        tracing::error!("Error fetching stock: {}", e);
        e
    })?;
    tracing::info!("Fetched {} stock items from database", items.len());
    Ok(Json(items))
}

pub async fn get_stock_alerts(
    State(state): State<AppState>,
) -> InventoryResult<Json<Vec<StockAlert>>> {
    let items = fetch_stock(&state.pool).await?;
    Ok(Json(stock_alerts(items)))
}

pub async fn create_stock_item(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<StockInput>,
) -> InventoryResult<(StatusCode, Json<StockItem>)> {
    let draft = input.validate()?;
    let item = insert_stock_item(&state.pool, draft).await?;
    tracing::info!("Created stock item {} ({})", item.name, item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_stock_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<StockInput>,
) -> InventoryResult<Json<StockItem>> {
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let draft = input.validate()?;
    let item = update_stock_item_by_id(&state.pool, id, draft)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(item))
}

pub async fn delete_stock_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InventoryResult<Json<MessageResponse>> {
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    if !delete_stock_item_by_id(&state.pool, id).await? {
        return Err(not_found());
    }
    tracing::info!("Deleted stock item {}", id);
    Ok(MessageResponse::new("Stock item deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::stock;

    #[test]
    fn test_validate_defaults_numbers_to_zero() {
        let input = StockInput {
            name: "Cable ties".to_string(),
            supplier: Some(" ".to_string()),
            ..Default::default()
        };
        let draft = input.validate().unwrap();
        assert_eq!(draft.quantity, 0);
        assert_eq!(draft.unit_price, 0.0);
        assert_eq!(draft.min_threshold, 0);
        assert_eq!(draft.supplier, None);
    }

    #[test]
    fn test_validate_rejects_negative_counts() {
        let input = StockInput {
            name: "Cable ties".to_string(),
            quantity: Some(-1),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let input = StockInput {
            name: "Cable ties".to_string(),
            min_threshold: Some(-3),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_alerts_keep_only_low_and_empty_items() {
        let items = vec![
            stock("plenty", 50, 1.0, 10),
            stock("empty", 0, 1.0, 10),
            stock("low", 4, 1.0, 10),
        ];
        let alerts = stock_alerts(items);
        let names: Vec<_> = alerts.iter().map(|a| a.item.name.as_str()).collect();
        assert_eq!(names, vec!["empty", "low"]);
        assert_eq!(alerts[0].status, StockStatus::OutOfStock);
        assert_eq!(alerts[1].status, StockStatus::LowStock);
    }

    #[test]
    fn test_alert_serializes_flat() {
        let alerts = stock_alerts(vec![stock("low", 1, 3.0, 2)]);
        let value = serde_json::to_value(&alerts[0]).unwrap();
        assert_eq!(value["name"], "low");
        assert_eq!(value["status"], "low-stock");
    }
}
