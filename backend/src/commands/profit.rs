use crate::commands::stock::fetch_stock;
use crate::commands::utility::{parse_date, parse_month, require_text, MessageResponse, Month};
use crate::db::{DbPool, ProfitKind, ProfitRecord, StockItem};
use crate::error::{InventoryError, InventoryResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfitInput {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<f64>,
    pub date: String,
    pub margin: Option<f64>,
}

#[derive(Debug, PartialEq)]
pub struct ProfitDraft {
    pub source: String,
    pub kind: ProfitKind,
    pub amount: f64,
    pub date: NaiveDate,
    pub margin: f64,
}

impl ProfitInput {
    pub fn validate(self) -> InventoryResult<ProfitDraft> {
        let kind = match self.kind.as_deref().map(str::trim) {
            Some("project") => ProfitKind::Project,
            Some("stock") => ProfitKind::Stock,
            other => {
                return Err(InventoryError::Validation(format!(
                    "type must be 'project' or 'stock', got {:?}",
                    other.unwrap_or("")
                )))
            }
        };
        let amount = self
            .amount
            .filter(|a| a.is_finite())
            .ok_or_else(|| InventoryError::Validation("amount is required".to_string()))?;

        Ok(ProfitDraft {
            source: require_text("source", &self.source)?,
            kind,
            amount,
            date: parse_date("date", &self.date)?,
            margin: self.margin.filter(|m| m.is_finite()).unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    pub fn month(&self) -> InventoryResult<Option<Month>> {
        parse_month(self.month.as_deref())
    }
}

pub fn filter_by_month(records: Vec<ProfitRecord>, month: Option<Month>) -> Vec<ProfitRecord> {
    match month {
        Some(m) => records.into_iter().filter(|r| m.contains(r.date)).collect(),
        None => records,
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitMetrics {
    pub month: String,
    pub monthly_profit: f64,
    pub project_revenue: f64,
    pub stock_revenue: f64,
    pub stock_turnover: f64,
}

fn sum_of_kind(profits: &[ProfitRecord], kind: ProfitKind) -> f64 {
    profits
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.amount)
        .sum()
}

pub fn profit_metrics(profits: &[ProfitRecord], stock: &[StockItem], month: Month) -> ProfitMetrics {
    let monthly_profit = profits
        .iter()
        .filter(|r| month.contains(r.date))
        .map(|r| r.amount)
        .sum();
    let project_revenue = sum_of_kind(profits, ProfitKind::Project);
    let stock_revenue = sum_of_kind(profits, ProfitKind::Stock);

    let total_stock_value: f64 = stock.iter().map(StockItem::total_value).sum();
    let stock_turnover = if total_stock_value > 0.0 {
        (stock_revenue / total_stock_value * 1000.0).round() / 10.0
    } else {
        0.0
    };

    ProfitMetrics {
        month: month.to_string(),
        monthly_profit,
        project_revenue,
        stock_revenue,
        stock_turnover,
    }
}

fn not_found() -> InventoryError {
    InventoryError::NotFound("Profit record not found".to_string())
}

pub async fn fetch_profits(pool: &DbPool) -> InventoryResult<Vec<ProfitRecord>> {
    let records =
        sqlx::query_as::<_, ProfitRecord>("SELECT * FROM profits ORDER BY created_at, id")
            .fetch_all(pool)
            .await?;
    Ok(records)
}

pub async fn insert_profit_record(pool: &DbPool, draft: ProfitDraft) -> InventoryResult<ProfitRecord> {
    let record = sqlx::query_as::<_, ProfitRecord>(
        "INSERT INTO profits (id, source, kind, amount, date, margin) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(draft.source)
    .bind(draft.kind)
    .bind(draft.amount)
    .bind(draft.date)
    .bind(draft.margin)
    .fetch_one(pool)
    .await?;
    Ok(record)
}

pub async fn update_profit_record_by_id(
    pool: &DbPool,
    id: Uuid,
    draft: ProfitDraft,
) -> InventoryResult<Option<ProfitRecord>> {
    let record = sqlx::query_as::<_, ProfitRecord>(
        "UPDATE profits SET source = $1, kind = $2, amount = $3, date = $4, margin = $5, updated_at = NOW() WHERE id = $6 RETURNING *",
    )
    .bind(draft.source)
    .bind(draft.kind)
    .bind(draft.amount)
    .bind(draft.date)
    .bind(draft.margin)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn delete_profit_record_by_id(pool: &DbPool, id: Uuid) -> InventoryResult<bool> {
    let result = sqlx::query("DELETE FROM profits WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Axum handlers

pub async fn get_profit_list(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> InventoryResult<Json<Vec<ProfitRecord>>> {
    let month = query.month()?;
    let records = fetch_profits(&state.pool).await.map_err(|e| {
        tracing::error!("Error fetching profits: {}", e);
        e
    })?;
    let records = filter_by_month(records, month);
    tracing::info!("Fetched {} profit records from database", records.len());
    Ok(Json(records))
}

pub async fn create_profit_record(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProfitInput>,
) -> InventoryResult<(StatusCode, Json<ProfitRecord>)> {
    let draft = input.validate()?;
    let record = insert_profit_record(&state.pool, draft).await?;
    tracing::info!("Recorded profit {} from {}", record.amount, record.source);
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_profit_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<ProfitInput>,
) -> InventoryResult<Json<ProfitRecord>> {
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let draft = input.validate()?;
    let record = update_profit_record_by_id(&state.pool, id, draft)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(record))
}

pub async fn delete_profit_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InventoryResult<Json<MessageResponse>> {
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    if !delete_profit_record_by_id(&state.pool, id).await? {
        return Err(not_found());
    }
    Ok(MessageResponse::new("Profit record deleted successfully"))
}

pub async fn get_profit_metrics(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> InventoryResult<Json<ProfitMetrics>> {
    let month = query.month()?.unwrap_or_else(Month::current);
    let (profits, stock) = tokio::try_join!(fetch_profits(&state.pool), fetch_stock(&state.pool))?;
    Ok(Json(profit_metrics(&profits, &stock, month)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{date, profit, stock};

    #[test]
    fn test_validate_profit_input() {
        let input: ProfitInput = serde_json::from_value(serde_json::json!({
            "source": "Kitchen remodel",
            "type": "project",
            "amount": 4200.0,
            "date": "2025-05-17",
            "margin": 18
        }))
        .unwrap();
        let draft = input.validate().unwrap();
        assert_eq!(draft.kind, ProfitKind::Project);
        assert_eq!(draft.date, date(2025, 5, 17));
        assert_eq!(draft.margin, 18.0);
    }

    #[test]
    fn test_validate_rejects_unknown_type_and_missing_amount() {
        let input = ProfitInput {
            source: "x".to_string(),
            kind: Some("service".to_string()),
            amount: Some(1.0),
            date: "2025-05-17".to_string(),
            margin: None,
        };
        assert!(input.validate().is_err());

        let input = ProfitInput {
            source: "x".to_string(),
            kind: Some("stock".to_string()),
            amount: None,
            date: "2025-05-17".to_string(),
            margin: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_filter_by_month() {
        let records = vec![
            profit("a", ProfitKind::Stock, 10.0, date(2025, 4, 30)),
            profit("b", ProfitKind::Stock, 20.0, date(2025, 5, 1)),
            profit("c", ProfitKind::Project, 30.0, date(2024, 5, 9)),
        ];
        let may: Month = "2025-05".parse().unwrap();
        let filtered = filter_by_month(records.clone(), Some(may));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].source, "b");
        assert_eq!(filter_by_month(records, None).len(), 3);
    }

    #[test]
    fn test_profit_metrics() {
        let profits = vec![
            profit("job", ProfitKind::Project, 1000.0, date(2025, 5, 2)),
            profit("sale", ProfitKind::Stock, 250.0, date(2025, 5, 20)),
            profit("old", ProfitKind::Stock, 50.0, date(2025, 3, 1)),
        ];
        let stock = vec![stock("a", 10, 20.0, 1), stock("b", 4, 25.0, 1)];
        let metrics = profit_metrics(&profits, &stock, "2025-05".parse().unwrap());

        assert_eq!(metrics.month, "2025-05");
        assert_eq!(metrics.monthly_profit, 1250.0);
        assert_eq!(metrics.project_revenue, 1000.0);
        assert_eq!(metrics.stock_revenue, 300.0);
        // 300 / 300 of stock value
        assert_eq!(metrics.stock_turnover, 100.0);
    }

    #[test]
    fn test_turnover_rounds_to_one_decimal_and_handles_empty_stock() {
        let profits = vec![profit("sale", ProfitKind::Stock, 100.0, date(2025, 5, 2))];
        let stock_items = vec![stock("a", 3, 100.0, 1)];
        let metrics = profit_metrics(&profits, &stock_items, "2025-05".parse().unwrap());
        assert_eq!(metrics.stock_turnover, 33.3);

        let metrics = profit_metrics(&profits, &[], "2025-05".parse().unwrap());
        assert_eq!(metrics.stock_turnover, 0.0);
    }
}
