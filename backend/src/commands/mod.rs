pub mod auth;
pub mod dashboard;
pub mod export;
pub mod profit;
pub mod project;
pub mod stock;
pub mod utility;
