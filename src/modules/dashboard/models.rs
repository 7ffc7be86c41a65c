use serde::{Deserialize, Serialize};

/// Aggregate statistics object served by `/api/v1/dashboard/stats`.
/// Wire names are camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_sales: u64,
    pub total_customers: u64,
    pub total_providers: u64,
    pub pending_orders: u64,
    pub monthly_revenue: f64,

    pub product_stats: ProductStats,
    pub sales_stats: SalesStats,
    pub stock_stats: StockStats,
    pub provider_stats: ProviderStats,

    #[serde(default)]
    pub top_categories: Vec<TopCategory>,
    #[serde(default)]
    pub recent_sales: Vec<RecentSale>,
    #[serde(default)]
    pub low_stock_products: Vec<LowStockProduct>,
    #[serde(default)]
    pub top_selling_products: Vec<TopSellingProduct>,
    #[serde(default)]
    pub recent_customers: Vec<RecentCustomer>,
    #[serde(default)]
    pub recent_providers: Vec<RecentProvider>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_active: u64,
    pub total_inactive: u64,
    pub total_categories: u64,
    pub average_price: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStats {
    pub today_sales: f64,
    pub week_sales: f64,
    pub month_sales: f64,
    pub year_sales: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockStats {
    pub low_stock_products: u64,
    pub out_of_stock_products: u64,
    pub total_stock_value: f64,
    pub average_stock_level: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    pub total_active: u64,
    pub total_inactive: u64,
    pub average_payment_term: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCategory {
    pub id: i64,
    pub name: String,
    pub product_count: u64,
    pub total_value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    pub id: i64,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: i64,
    pub name: String,
    pub current_stock: f64,
    pub minimum_stock: f64,
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingProduct {
    pub id: i64,
    pub name: String,
    pub total_sold: f64,
    pub revenue: f64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCustomer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub total_purchases: f64,
    pub last_purchase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentProvider {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub total_products: u64,
    pub last_update: String,
}

/// One category slice from `/api/v1/dashboard/categories`. The backend has
/// served two shapes over time, so the optional fields cover both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryData>,
}
