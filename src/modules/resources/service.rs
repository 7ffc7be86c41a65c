use crate::infrastructure::http::{ApiClient, Paginated};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::Validator;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use super::models::{
    Customer, CustomerCreate, CustomerUpdate, InventoryItem, InventoryItemCreate,
    InventoryItemUpdate, Product, ProductCreate, ProductUpdate, Provider, ProviderCreate,
    ProviderUpdate, Sale, SaleCreate, SaleUpdate,
};

/// Binding between a record type and its place in the REST surface.
pub trait Resource: DeserializeOwned + Serialize + Send + Sync {
    const PATH: &'static str;
    /// Whether the API exposes the unpaginated `<path>/all` listing
    const BULK_LIST: bool = false;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;
}

impl Resource for Product {
    const PATH: &'static str = "/api/v1/products";
    const BULK_LIST: bool = true;
    type Create = ProductCreate;
    type Update = ProductUpdate;
}

impl Resource for Provider {
    const PATH: &'static str = "/api/v1/providers";
    const BULK_LIST: bool = true;
    type Create = ProviderCreate;
    type Update = ProviderUpdate;
}

impl Resource for Customer {
    const PATH: &'static str = "/api/v1/customers";
    type Create = CustomerCreate;
    type Update = CustomerUpdate;
}

impl Resource for Sale {
    const PATH: &'static str = "/api/v1/sales";
    type Create = SaleCreate;
    type Update = SaleUpdate;
}

impl Resource for InventoryItem {
    const PATH: &'static str = "/api/v1/inventory";
    type Create = InventoryItemCreate;
    type Update = InventoryItemUpdate;
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            search: None,
        }
    }
}

impl ListParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        query
    }
}

/// Generic CRUD surface over one resource endpoint family.
pub struct ResourceService<R: Resource> {
    api: Arc<ApiClient>,
    _resource: PhantomData<R>,
}

impl<R: Resource> ResourceService<R> {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    pub async fn list(&self, params: &ListParams) -> AppResult<Paginated<R>> {
        Validator::validate_pagination(params.page, params.limit)?;
        self.api.get_json(R::PATH, &params.query()).await
    }

    pub async fn list_all(&self) -> AppResult<Vec<R>> {
        if !R::BULK_LIST {
            return Err(AppError::NotFound(format!(
                "{}/all is not exposed by the API",
                R::PATH
            )));
        }
        self.api.get_json(&format!("{}/all", R::PATH), &[]).await
    }

    pub async fn get(&self, id: i64) -> AppResult<R> {
        self.api.get_json(&format!("{}/{}", R::PATH, id), &[]).await
    }

    pub async fn create(&self, payload: &R::Create) -> AppResult<R> {
        self.api.post_json(R::PATH, payload).await
    }

    pub async fn update(&self, id: i64, payload: &R::Update) -> AppResult<R> {
        self.api
            .put_json(&format!("{}/{}", R::PATH, id), payload)
            .await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.api.delete(&format!("{}/{}", R::PATH, id)).await
    }
}

pub type ProductService = ResourceService<Product>;
pub type ProviderService = ResourceService<Provider>;
pub type CustomerService = ResourceService<Customer>;
pub type SaleService = ResourceService<Sale>;
pub type InventoryService = ResourceService<InventoryItem>;
