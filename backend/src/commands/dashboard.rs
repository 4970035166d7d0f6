use crate::commands::profit::fetch_profits;
use crate::commands::project::fetch_projects;
use crate::commands::stock::fetch_stock;
use crate::commands::utility::{format_amount, format_time_ago, start_of_day};
use crate::db::{ProfitRecord, Project, StockItem};
use crate::error::InventoryResult;
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const MAX_ACTIVITY: usize = 4;
const RECENT_PROJECTS: usize = 2;
const LOW_STOCK_ALERTS: usize = 2;
const RECENT_PROFITS: usize = 1;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Activity {
    pub icon: &'static str,
    pub title: String,
    pub time: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub total_projects: usize,
    pub total_stock_items: i64,
    pub total_profit: f64,
    pub stock_value: f64,
    pub projects_by_status: BTreeMap<String, usize>,
    pub low_stock_items: usize,
    pub recent_activity: Vec<Activity>,
}

pub fn summarize(
    projects: &[Project],
    stock: &[StockItem],
    profits: &[ProfitRecord],
    now: DateTime<Utc>,
) -> DashboardAnalytics {
    let mut projects_by_status = BTreeMap::new();
    for project in projects {
        *projects_by_status.entry(project.status.clone()).or_insert(0) += 1;
    }

    DashboardAnalytics {
        total_projects: projects.len(),
        total_stock_items: stock.iter().map(|i| i64::from(i.quantity)).sum(),
        total_profit: profits.iter().map(|r| r.amount).sum(),
        stock_value: stock.iter().map(StockItem::total_value).sum(),
        projects_by_status,
        low_stock_items: stock.iter().filter(|i| i.is_low()).count(),
        recent_activity: recent_activity(projects, stock, profits, now),
    }
}

/// Newest projects, then low-stock alerts, then the latest profit, capped at four entries.
pub fn recent_activity(
    projects: &[Project],
    stock: &[StockItem],
    profits: &[ProfitRecord],
    now: DateTime<Utc>,
) -> Vec<Activity> {
    let mut activities = Vec::with_capacity(RECENT_PROJECTS + LOW_STOCK_ALERTS + RECENT_PROFITS);

    let mut newest_projects: Vec<&Project> = projects.iter().collect();
    newest_projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    activities.extend(newest_projects.into_iter().take(RECENT_PROJECTS).map(|p| Activity {
        icon: "fas fa-project-diagram",
        title: format!("Project {}: {}", p.status, p.name),
        time: format_time_ago(p.created_at, now),
    }));

    activities.extend(
        stock
            .iter()
            .filter(|i| i.is_low())
            .take(LOW_STOCK_ALERTS)
            .map(|i| Activity {
                icon: "fas fa-exclamation-triangle",
                title: format!("Low stock alert: {}", i.name),
                time: "Now".to_string(),
            }),
    );

    let mut latest_profits: Vec<&ProfitRecord> = profits.iter().collect();
    latest_profits.sort_by(|a, b| b.date.cmp(&a.date));
    activities.extend(latest_profits.into_iter().take(RECENT_PROFITS).map(|r| Activity {
        icon: "fas fa-chart-line",
        title: format!(
            "Profit recorded: ${} from {}",
            format_amount(r.amount),
            r.source
        ),
        time: format_time_ago(start_of_day(r.date), now),
    }));

    activities.truncate(MAX_ACTIVITY);
    activities
}

pub async fn get_dashboard_analytics(
    State(state): State<AppState>,
) -> InventoryResult<Json<DashboardAnalytics>> {
    let (projects, stock, profits) = tokio::try_join!(
        fetch_projects(&state.pool),
        fetch_stock(&state.pool),
        fetch_profits(&state.pool),
    )
    .map_err(|e| {
        tracing::error!("Error fetching dashboard analytics: {}", e);
        e
    })?;

    Ok(Json(summarize(&projects, &stock, &profits, Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{at, date, profit, project, stock};
    use crate::db::ProfitKind;

    #[test]
    fn test_empty_collections() {
        let analytics = summarize(&[], &[], &[], at(2025, 6, 1, 0, 0));
        assert_eq!(analytics.total_projects, 0);
        assert_eq!(analytics.total_stock_items, 0);
        assert_eq!(analytics.total_profit, 0.0);
        assert_eq!(analytics.stock_value, 0.0);
        assert!(analytics.projects_by_status.is_empty());
        assert!(analytics.recent_activity.is_empty());
    }

    #[test]
    fn test_totals() {
        let now = at(2025, 6, 10, 12, 0);
        let projects = vec![
            project("A", "active", at(2025, 6, 1, 0, 0)),
            project("B", "completed", at(2025, 6, 2, 0, 0)),
            project("C", "active", at(2025, 6, 3, 0, 0)),
        ];
        let stock = vec![
            stock("bolts", 100, 0.25, 20),
            stock("nuts", 5, 0.1, 20),
            stock("washers", 0, 0.05, 0),
        ];
        let profits = vec![
            profit("A", ProfitKind::Project, 1200.0, date(2025, 6, 5)),
            profit("bolts", ProfitKind::Stock, -50.0, date(2025, 6, 6)),
        ];

        let analytics = summarize(&projects, &stock, &profits, now);
        assert_eq!(analytics.total_projects, 3);
        assert_eq!(analytics.total_stock_items, 105);
        assert_eq!(analytics.total_profit, 1150.0);
        assert!((analytics.stock_value - 25.5).abs() < 1e-9);
        assert_eq!(analytics.projects_by_status.get("active"), Some(&2));
        assert_eq!(analytics.projects_by_status.get("completed"), Some(&1));
        assert_eq!(analytics.low_stock_items, 2);
    }

    #[test]
    fn test_activity_order_and_cap() {
        let now = at(2025, 6, 10, 12, 0);
        let projects = vec![
            project("Oldest", "planning", at(2025, 6, 1, 0, 0)),
            project("Newest", "active", at(2025, 6, 10, 11, 30)),
            project("Middle", "completed", at(2025, 6, 10, 9, 0)),
        ];
        let stock = vec![
            stock("low one", 1, 1.0, 5),
            stock("fine", 50, 1.0, 5),
            stock("low two", 2, 1.0, 5),
            stock("low three", 0, 1.0, 5),
        ];
        let profits = vec![profit("Shop", ProfitKind::Stock, 10.0, date(2025, 6, 9))];

        let activity = recent_activity(&projects, &stock, &profits, now);
        let titles: Vec<_> = activity.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Project active: Newest",
                "Project completed: Middle",
                "Low stock alert: low one",
                "Low stock alert: low two",
            ]
        );
        assert_eq!(activity[0].time, "30 minutes ago");
        assert_eq!(activity[1].time, "3 hours ago");
        assert_eq!(activity[2].time, "Now");
    }

    #[test]
    fn test_latest_profit_fills_remaining_slot() {
        let now = at(2025, 6, 10, 12, 0);
        let projects = vec![project("Solo", "active", at(2025, 6, 8, 12, 0))];
        let profits = vec![
            profit("Older", ProfitKind::Project, 500.0, date(2025, 5, 1)),
            profit("Big sale", ProfitKind::Stock, 12345.5, date(2025, 6, 9)),
        ];

        let activity = recent_activity(&projects, &[], &profits, now);
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].time, "2 days ago");
        assert_eq!(activity[1].icon, "fas fa-chart-line");
        assert_eq!(activity[1].title, "Profit recorded: $12,345.5 from Big sale");
        assert_eq!(activity[1].time, "1 days ago");
    }

    #[test]
    fn test_analytics_serialize_camel_case() {
        let analytics = summarize(&[], &[stock("x", 1, 2.0, 3)], &[], at(2025, 6, 1, 0, 0));
        let value = serde_json::to_value(&analytics).unwrap();
        assert_eq!(value["lowStockItems"], 1);
        assert_eq!(value["stockValue"], 2.0);
        assert!(value["projectsByStatus"].is_object());
        assert_eq!(value["recentActivity"][0]["time"], "Now");
    }
}
