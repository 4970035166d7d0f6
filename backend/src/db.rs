use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{InventoryError, InventoryResult};

pub type DbPool = Pool<Postgres>;

pub fn init_pool_with_options(opts: PgConnectOptions) -> DbPool {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts)
}

pub fn init_pool(database_url: &str) -> InventoryResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| InventoryError::Config(format!("Invalid DB URL: {}", e)))?;

    Ok(init_pool_with_options(opts))
}

pub async fn init_database(pool: &DbPool, config: &Config) -> InventoryResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    ensure_admin(pool, &config.admin_email, &config.admin_password).await?;
    tracing::info!("Database ready");
    Ok(())
}

/// Seeds the single admin account. An existing record is never overwritten.
pub async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> InventoryResult<()> {
    let admin_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;

    if admin_exists.0 == 0 {
        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        sqlx::query(
            "INSERT INTO admin (id, email, password_hash, role) VALUES ($1, $2, $3, 'admin') ON CONFLICT (email) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hash)
        .execute(pool)
        .await?;
        tracing::info!("Admin user created for {}", email);
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub budget: f64,
    pub profit: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub quantity: i32,
    pub unit_price: f64,
    pub min_threshold: i32,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockItem {
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_threshold
    }

    pub fn status(&self) -> StockStatus {
        if self.quantity == 0 {
            StockStatus::OutOfStock
        } else if self.is_low() {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    pub fn total_value(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "profit_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProfitKind {
    Project,
    Stock,
}

impl ProfitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfitKind::Project => "project",
            ProfitKind::Stock => "stock",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfitRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: ProfitKind,
    pub amount: f64,
    pub date: NaiveDate,
    pub margin: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(stock("a", 0, 1.0, 5).status(), StockStatus::OutOfStock);
        assert_eq!(stock("b", 0, 1.0, 0).status(), StockStatus::OutOfStock);
        assert_eq!(stock("c", 5, 1.0, 5).status(), StockStatus::LowStock);
        assert_eq!(stock("d", 6, 1.0, 5).status(), StockStatus::InStock);
    }

    #[test]
    fn test_zero_quantity_with_zero_threshold_is_low() {
        assert!(stock("bolts", 0, 0.5, 0).is_low());
    }

    #[test]
    fn test_records_serialize_with_document_field_names() {
        let record = profit("Client A", ProfitKind::Project, 1500.0, date(2025, 3, 4));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "project");
        assert_eq!(value["date"], "2025-03-04");
        assert!(value.get("_id").is_some());
        assert!(value.get("createdAt").is_some());

        let item = stock("Widget", 3, 2.5, 1);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["unitPrice"], 2.5);
        assert_eq!(value["minThreshold"], 1);
    }

    #[test]
    fn test_stock_status_serializes_kebab_case() {
        let value = serde_json::to_value(StockStatus::OutOfStock).unwrap();
        assert_eq!(value, "out-of-stock");
    }
}
