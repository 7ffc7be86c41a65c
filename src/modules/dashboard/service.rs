use crate::infrastructure::http::ApiClient;
use crate::shared::errors::AppResult;
use std::sync::Arc;

use super::models::{CategoriesResponse, CategoryData, DashboardStats};

pub struct DashboardService {
    api: Arc<ApiClient>,
}

impl DashboardService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        self.api.get_json("/api/v1/dashboard/stats", &[]).await
    }

    pub async fn categories(&self) -> AppResult<Vec<CategoryData>> {
        let response: CategoriesResponse =
            self.api.get_json("/api/v1/dashboard/categories", &[]).await?;
        Ok(response.categories)
    }
}
