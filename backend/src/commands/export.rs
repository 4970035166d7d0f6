//! CSV reports over the three collections.
//!
//! The full export is a multi-section document: a plain-text preamble, then
//! one section per collection with its own header line. Data rows always
//! quote every field. The profit report is a regular single-table CSV.

use crate::commands::profit::{fetch_profits, filter_by_month, MonthQuery};
use crate::commands::project::fetch_projects;
use crate::commands::stock::fetch_stock;
use crate::commands::utility::format_amount;
use crate::db::{ProfitRecord, Project, StockItem};
use crate::error::{InventoryError, InventoryResult};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

const PROJECT_HEADER: &str = "Name,Status,Start Date,Budget,Profit,Description";
const STOCK_HEADER: &str = "Name,Category,Quantity,Unit Price,Total Value,Min Threshold,Supplier";
const PROFIT_HEADER: [&str; 5] = ["Source", "Type", "Amount", "Date", "Margin"];

fn write_rows<I>(rows: I, quote_style: QuoteStyle) -> InventoryResult<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(quote_style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| InventoryError::Internal(format!("Failed to flush CSV writer: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| InventoryError::Internal(format!("CSV output is not UTF-8: {}", e)))
}

fn project_row(p: &Project) -> Vec<String> {
    vec![
        p.name.clone(),
        p.status.clone(),
        p.start_date.map(|d| d.to_string()).unwrap_or_default(),
        p.budget.to_string(),
        p.profit.to_string(),
        p.description.clone().unwrap_or_default(),
    ]
}

fn stock_row(i: &StockItem) -> Vec<String> {
    vec![
        i.name.clone(),
        i.category.clone().unwrap_or_default(),
        i.quantity.to_string(),
        i.unit_price.to_string(),
        i.total_value().to_string(),
        i.min_threshold.to_string(),
        i.supplier.clone().unwrap_or_default(),
    ]
}

fn profit_row(r: &ProfitRecord) -> Vec<String> {
    vec![
        r.source.clone(),
        r.kind.as_str().to_string(),
        r.amount.to_string(),
        r.date.to_string(),
        format!("{}%", r.margin),
    ]
}

pub fn full_report(
    projects: &[Project],
    stock: &[StockItem],
    profits: &[ProfitRecord],
    exported_at: DateTime<Utc>,
) -> InventoryResult<String> {
    let total_stock_value: f64 = stock.iter().map(StockItem::total_value).sum();
    let total_profit: f64 = profits.iter().map(|r| r.amount).sum();

    let mut csv = String::from("INVENTORY MANAGEMENT SYSTEM - FULL EXPORT\n");
    csv.push_str(&format!("Export Date: {}\n", exported_at.format("%-m/%-d/%Y")));
    csv.push_str(&format!("Total Projects: {}\n", projects.len()));
    csv.push_str(&format!(
        "Total Stock Value: ${}\n",
        format_amount(total_stock_value)
    ));
    csv.push_str(&format!("Total Profit: ${}\n\n", format_amount(total_profit)));

    csv.push_str("PROJECTS\n");
    csv.push_str(PROJECT_HEADER);
    csv.push('\n');
    csv.push_str(&write_rows(projects.iter().map(project_row), QuoteStyle::Always)?);
    csv.push('\n');

    csv.push_str("STOCK ITEMS\n");
    csv.push_str(STOCK_HEADER);
    csv.push('\n');
    csv.push_str(&write_rows(stock.iter().map(stock_row), QuoteStyle::Always)?);
    csv.push('\n');

    csv.push_str("PROFIT RECORDS\n");
    csv.push_str(&PROFIT_HEADER.join(","));
    csv.push('\n');
    csv.push_str(&write_rows(profits.iter().map(profit_row), QuoteStyle::Always)?);

    Ok(csv)
}

pub fn profit_report(profits: &[ProfitRecord]) -> InventoryResult<String> {
    let header = PROFIT_HEADER.iter().map(|h| h.to_string()).collect();
    let rows = std::iter::once(header).chain(profits.iter().map(profit_row));
    write_rows(rows, QuoteStyle::Necessary)
}

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn export_full_report(State(state): State<AppState>) -> InventoryResult<Response> {
    let (projects, stock, profits) = tokio::try_join!(
        fetch_projects(&state.pool),
        fetch_stock(&state.pool),
        fetch_profits(&state.pool),
    )?;

    let now = Utc::now();
    let body = full_report(&projects, &stock, &profits, now)?;
    tracing::info!(
        "Exported {} projects, {} stock items, {} profit records",
        projects.len(),
        stock.len(),
        profits.len()
    );

    let filename = format!("inventory-full-export-{}.csv", now.format("%Y-%m-%d"));
    Ok(csv_attachment(&filename, body))
}

pub async fn export_profit_report(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> InventoryResult<Response> {
    let month = query.month()?;
    let profits = filter_by_month(fetch_profits(&state.pool).await?, month);
    let body = profit_report(&profits)?;
    Ok(csv_attachment("profit-report.csv", body))
}
