pub mod models;
pub mod service;

pub use models::{CategoryData, DashboardStats};
pub use service::DashboardService;
