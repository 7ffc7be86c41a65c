pub mod infrastructure;
pub mod modules;
pub mod shared;

pub use infrastructure::http::{ApiClient, Paginated};
pub use modules::auth::{
    AuthManager, FileTokenStore, MemoryTokenStore, SessionResponse, SessionService, Token,
    TokenStore,
};
pub use modules::dashboard::{CategoryData, DashboardService, DashboardStats};
pub use modules::import::{
    ChunkReport, ChunkedImportDriver, ImportObserver, ImportOptions, ImportOutcome, ImportRequest,
    ImportSummary, NoopObserver, RunPhase,
};
pub use modules::resources::{
    Customer, CustomerService, InventoryItem, InventoryService, ListParams, Product,
    ProductService, Provider, ProviderService, Resource, ResourceService, Sale, SaleService,
};
pub use shared::config::{Config, Credentials};
pub use shared::errors::{AppError, AppResult};
pub use shared::utils::logger::init_logger;
