pub mod models;
pub mod service;

pub use models::{
    Customer, CustomerCreate, CustomerUpdate, InventoryItem, InventoryItemCreate,
    InventoryItemUpdate, Product, ProductCreate, ProductUpdate, Provider, ProviderCreate,
    ProviderUpdate, Sale, SaleCreate, SaleUpdate,
};
pub use service::{
    CustomerService, InventoryService, ListParams, ProductService, ProviderService, Resource,
    ResourceService, SaleService,
};
