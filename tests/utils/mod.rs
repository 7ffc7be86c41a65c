//! In-process mock of the ERP REST proxy shared by the integration tests.
#![allow(dead_code)]

use axum::extract::{Form, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use electroerp::{ApiClient, AuthManager, Config, Credentials, MemoryTokenStore};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct ChunkCall {
    pub start_row: u32,
    pub chunk_size: u32,
    pub provider: String,
    pub file_len: usize,
    pub at: Instant,
}

#[derive(Default)]
pub struct MockState {
    pub token_requests: AtomicUsize,
    pub reject_logins: AtomicBool,
    /// When set, every bearer token is rejected, even a freshly issued one
    pub always_reject_bearer: AtomicBool,
    /// When set and the scripted replies run out, the import endpoint
    /// answers 422 instead of the zero-attempted default
    pub fail_after_scripted: AtomicBool,
    token_counter: AtomicUsize,
    valid_tokens: Mutex<Vec<String>>,
    pub product_requests: AtomicUsize,
    pub chunk_calls: Mutex<Vec<ChunkCall>>,
    pub chunk_replies: Mutex<VecDeque<Value>>,
}

impl MockState {
    /// Invalidate every issued token, as the backend does when sessions
    /// expire server-side. The client still holds its copy.
    pub fn expire_all_tokens(&self) {
        self.valid_tokens.lock().unwrap().clear();
    }

    pub fn push_chunk_reply(&self, attempted: u32, created: u32, failed: u32) {
        let created_items: Vec<Value> = (0..created)
            .map(|i| json!({"id": i, "name": format!("product-{}", i)}))
            .collect();
        let failed_items: Vec<Value> = (0..failed)
            .map(|i| json!({"name": format!("broken-{}", i), "error": "missing price"}))
            .collect();
        self.chunk_replies.lock().unwrap().push_back(json!({
            "productos_creados": created_items,
            "productos_fallidos": failed_items,
            "total_intentados": attempted,
            "total_creados": created,
            "total_fallidos": failed,
        }));
    }

    pub fn chunk_calls(&self) -> Vec<ChunkCall> {
        self.chunk_calls.lock().unwrap().clone()
    }

    fn issue_token(&self) -> String {
        let n = self.token_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("tok-{}", n);
        self.valid_tokens.lock().unwrap().push(token.clone());
        token
    }

    fn bearer_ok(&self, headers: &HeaderMap) -> bool {
        if self.always_reject_bearer.load(Ordering::SeqCst) {
            return false;
        }
        let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) else {
            return false;
        };
        let Some(token) = value.strip_prefix("Bearer ") else {
            return false;
        };
        self.valid_tokens.lock().unwrap().iter().any(|t| t == token)
    }
}

pub struct MockErp {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub async fn spawn() -> MockErp {
    let state = Arc::new(MockState::default());

    let app = Router::new()
        .route("/token", post(token))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/mistral-llm/process-excel", post(process_excel))
        .route("/api/v1/dashboard/stats", get(dashboard_stats))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockErp { base_url, state }
}

pub fn test_config(base_url: &str) -> Config {
    Config::new(
        base_url,
        Credentials {
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
        },
    )
}

pub fn client_stack(base_url: &str) -> (Arc<AuthManager>, Arc<ApiClient>) {
    let config = test_config(base_url);
    let auth = Arc::new(
        AuthManager::new(&config, Arc::new(MemoryTokenStore::default())).unwrap(),
    );
    let api = Arc::new(ApiClient::new(&config, auth.clone()).unwrap());
    (auth, api)
}

#[derive(Deserialize)]
struct TokenForm {
    username: String,
    password: String,
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<TokenForm>,
) -> impl IntoResponse {
    state.token_requests.fetch_add(1, Ordering::SeqCst);
    if state.reject_logins.load(Ordering::SeqCst)
        || form.username != USERNAME
        || form.password != PASSWORD
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        );
    }
    let token = state.issue_token();
    (
        StatusCode::OK,
        Json(json!({
            "access_token": token,
            "refresh_token": format!("{}-refresh", token),
        })),
    )
}

fn sample_product(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Frigorífico Combi",
        "code": "FRIGO-001",
        "category": "Frío",
        "price": 499.9,
        "stock": 12.0,
        "image_url": null
    })
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_ok(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        );
    }

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params
        .get("limit")
        .and_then(|p| p.parse().ok())
        .unwrap_or(20);
    (
        StatusCode::OK,
        Json(json!({
            "data": [sample_product(1)],
            "total": 1,
            "page": page,
            "limit": limit,
            "pages": 1
        })),
    )
}

async fn get_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    if !state.bearer_ok(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        );
    }
    if id == 1 {
        (StatusCode::OK, Json(sample_product(1)))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Product not found"})),
        )
    }
}

async fn process_excel(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    if !state.bearer_ok(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        );
    }

    let mut start_row = 0u32;
    let mut chunk_size = 0u32;
    let mut provider = String::new();
    let mut file_len = 0usize;
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or_default().to_string().as_str() {
            "file" => file_len = field.bytes().await.unwrap().len(),
            "start_row" => start_row = field.text().await.unwrap().parse().unwrap(),
            "chunk_size" => chunk_size = field.text().await.unwrap().parse().unwrap(),
            "proveedor_nombre" => provider = field.text().await.unwrap(),
            _ => {
                let _ = field.bytes().await;
            }
        }
    }
    state.chunk_calls.lock().unwrap().push(ChunkCall {
        start_row,
        chunk_size,
        provider,
        file_len,
        at: Instant::now(),
    });

    let scripted = state.chunk_replies.lock().unwrap().pop_front();
    match scripted {
        Some(reply) => (StatusCode::OK, Json(reply)),
        None if state.fail_after_scripted.load(Ordering::SeqCst) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{
                    "loc": ["body", "file"],
                    "msg": "invalid spreadsheet",
                    "type": "value_error"
                }]
            })),
        ),
        None => (
            StatusCode::OK,
            Json(json!({
                "productos_creados": [],
                "productos_fallidos": [],
                "total_intentados": 0,
                "total_creados": 0,
                "total_fallidos": 0
            })),
        ),
    }
}

async fn dashboard_stats(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !state.bearer_ok(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "totalProducts": 120,
            "totalSales": 48,
            "totalCustomers": 33,
            "totalProviders": 7,
            "pendingOrders": 4,
            "monthlyRevenue": 15230.5,
            "productStats": {
                "totalActive": 110, "totalInactive": 10, "totalCategories": 9,
                "averagePrice": 88.4, "totalValue": 10608.0
            },
            "salesStats": {
                "todaySales": 3.0, "weekSales": 12.0, "monthSales": 48.0,
                "yearSales": 310.0, "averageOrderValue": 317.3
            },
            "stockStats": {
                "lowStockProducts": 6, "outOfStockProducts": 2,
                "totalStockValue": 80000.0, "averageStockLevel": 14.2
            },
            "providerStats": {
                "totalActive": 6, "totalInactive": 1, "averagePaymentTerm": 30.0
            },
            "topCategories": [],
            "recentSales": [],
            "lowStockProducts": [],
            "topSellingProducts": [],
            "recentCustomers": [],
            "recentProviders": []
        })),
    )
}
