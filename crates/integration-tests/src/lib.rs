//! Integration test harness for Tillhouse POS.
//!
//! Boots the POS app in-process against a stub backend, both on ephemeral
//! ports, and drives them with a cookie-keeping reqwest client so session
//! state (the cart draft) carries across requests like a real browser.
//!
//! ```rust,ignore
//! let ctx = TestContext::spawn().await;
//! ctx.seed_item(1, "Black Tea 500g", "450.00", 12).await;
//!
//! let resp = ctx.client.get(ctx.url("/orders")).send().await.unwrap();
//! assert_eq!(resp.status(), 200);
//! ```

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use tillhouse_core::{Customer, CustomerId, Item, ItemId, Money, NewCustomer, NewItem};
use tillhouse_pos::app::app;
use tillhouse_pos::config::PosConfig;
use tillhouse_pos::state::AppState;

/// Shared state of the stub backend.
#[derive(Default)]
pub struct BackendState {
    customers: Mutex<Vec<Customer>>,
    items: Mutex<Vec<Item>>,
    orders: Mutex<Vec<serde_json::Value>>,
    next_customer_id: AtomicI32,
    next_item_id: AtomicI32,
    fail_orders: AtomicBool,
    fail_items: AtomicBool,
}

/// In-memory stand-in for the backend REST service.
#[derive(Clone, Default)]
pub struct TestBackend {
    state: Arc<BackendState>,
}

impl TestBackend {
    /// Router implementing the backend REST contract.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(|| async { "ok" }))
            .route("/api/customers", get(list_customers).post(create_customer))
            .route(
                "/api/customers/{id}",
                axum::routing::put(update_customer).delete(delete_customer),
            )
            .route("/api/items", get(list_items).post(create_item))
            .route(
                "/api/items/{id}",
                axum::routing::put(update_item).delete(delete_item),
            )
            .route("/api/orders", axum::routing::post(place_order))
            .with_state(Arc::clone(&self.state))
    }

    /// Insert a customer directly, bypassing HTTP.
    pub async fn seed_customer(&self, id: i32, name: &str, address: &str) {
        self.state.customers.lock().await.push(Customer {
            id: CustomerId::new(id),
            name: name.to_string(),
            address: address.to_string(),
        });
        self.state.next_customer_id.fetch_max(id, Ordering::SeqCst);
    }

    /// Insert an item directly, bypassing HTTP.
    pub async fn seed_item(&self, id: i32, description: &str, price: &str, stock: u32) {
        self.state.items.lock().await.push(Item {
            id: ItemId::new(id),
            description: description.to_string(),
            unit_price: Money::new(Decimal::from_str(price).expect("valid decimal")),
            qty_on_hand: stock,
        });
        self.state.next_item_id.fetch_max(id, Ordering::SeqCst);
    }

    /// Raw order payloads received so far.
    pub async fn orders(&self) -> Vec<serde_json::Value> {
        self.state.orders.lock().await.clone()
    }

    /// Current item records.
    pub async fn items(&self) -> Vec<Item> {
        self.state.items.lock().await.clone()
    }

    /// Current customer records.
    pub async fn customers(&self) -> Vec<Customer> {
        self.state.customers.lock().await.clone()
    }

    /// Make `POST /api/orders` return 500 for subsequent requests.
    pub fn set_fail_orders(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Make `GET /api/items` return 500 for subsequent requests.
    pub fn set_fail_items(&self, fail: bool) {
        self.state.fail_items.store(fail, Ordering::SeqCst);
    }
}

async fn list_customers(State(state): State<Arc<BackendState>>) -> Json<Vec<Customer>> {
    Json(state.customers.lock().await.clone())
}

async fn create_customer(
    State(state): State<Arc<BackendState>>,
    Json(new): Json<NewCustomer>,
) -> (StatusCode, Json<Customer>) {
    let id = state.next_customer_id.fetch_add(1, Ordering::SeqCst) + 1;
    let customer = Customer {
        id: CustomerId::new(id),
        name: new.name,
        address: new.address,
    };
    state.customers.lock().await.push(customer.clone());
    (StatusCode::CREATED, Json(customer))
}

async fn update_customer(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i32>,
    Json(new): Json<NewCustomer>,
) -> axum::response::Response {
    let mut customers = state.customers.lock().await;
    match customers.iter_mut().find(|c| c.id == CustomerId::new(id)) {
        Some(customer) => {
            customer.name = new.name;
            customer.address = new.address;
            Json(customer.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_customer(State(state): State<Arc<BackendState>>, Path(id): Path<i32>) -> StatusCode {
    state
        .customers
        .lock()
        .await
        .retain(|c| c.id != CustomerId::new(id));
    StatusCode::NO_CONTENT
}

async fn list_items(State(state): State<Arc<BackendState>>) -> axum::response::Response {
    if state.fail_items.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(state.items.lock().await.clone()).into_response()
}

async fn create_item(
    State(state): State<Arc<BackendState>>,
    Json(new): Json<NewItem>,
) -> (StatusCode, Json<Item>) {
    let id = state.next_item_id.fetch_add(1, Ordering::SeqCst) + 1;
    let item = Item {
        id: ItemId::new(id),
        description: new.description,
        unit_price: new.unit_price,
        qty_on_hand: new.qty_on_hand,
    };
    state.items.lock().await.push(item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn update_item(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i32>,
    Json(new): Json<NewItem>,
) -> axum::response::Response {
    let mut items = state.items.lock().await;
    match items.iter_mut().find(|it| it.id == ItemId::new(id)) {
        Some(item) => {
            item.description = new.description;
            item.unit_price = new.unit_price;
            item.qty_on_hand = new.qty_on_hand;
            Json(item.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_item(State(state): State<Arc<BackendState>>, Path(id): Path<i32>) -> StatusCode {
    state
        .items
        .lock()
        .await
        .retain(|it| it.id != ItemId::new(id));
    StatusCode::NO_CONTENT
}

async fn place_order(
    State(state): State<Arc<BackendState>>,
    Json(payload): Json<serde_json::Value>,
) -> StatusCode {
    if state.fail_orders.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    // Mirror the real backend's stock decrement
    let mut items = state.items.lock().await;
    if let Some(details) = payload.get("orderDetails").and_then(|d| d.as_array()) {
        for detail in details {
            let item_id = detail.get("itemId").and_then(serde_json::Value::as_i64);
            let qty = detail.get("qty").and_then(serde_json::Value::as_u64);
            if let (Some(item_id), Some(qty)) = (item_id, qty) {
                #[allow(clippy::cast_possible_truncation)]
                if let Some(item) = items
                    .iter_mut()
                    .find(|it| it.id == ItemId::new(item_id as i32))
                {
                    item.qty_on_hand = item.qty_on_hand.saturating_sub(qty as u32);
                }
            }
        }
    }
    drop(items);

    state.orders.lock().await.push(payload);
    StatusCode::CREATED
}

/// A running POS instance wired to a stub backend.
pub struct TestContext {
    /// Cookie-keeping HTTP client (sessions behave like a browser).
    pub client: reqwest::Client,
    /// Base URL of the in-process POS server.
    pub pos_url: String,
    /// Handle to the stub backend for seeding and assertions.
    pub backend: TestBackend,
}

impl TestContext {
    /// Start the stub backend and the POS app on ephemeral ports.
    ///
    /// # Panics
    ///
    /// Panics if either server fails to bind.
    pub async fn spawn() -> Self {
        let backend = TestBackend::default();

        let backend_listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind backend listener");
        let backend_addr = backend_listener.local_addr().expect("backend addr");
        let backend_router = backend.router();
        tokio::spawn(async move {
            axum::serve(backend_listener, backend_router)
                .await
                .expect("Backend server error");
        });

        let config = test_config(backend_addr);
        let state = AppState::new(config);

        let pos_listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind POS listener");
        let pos_addr = pos_listener.local_addr().expect("pos addr");
        let pos_app = app(state);
        tokio::spawn(async move {
            axum::serve(pos_listener, pos_app)
                .await
                .expect("POS server error");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            pos_url: format!("http://{pos_addr}"),
            backend,
        }
    }

    /// Full URL for a POS path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.pos_url)
    }

    /// Seed a customer into the stub backend.
    pub async fn seed_customer(&self, id: i32, name: &str, address: &str) {
        self.backend.seed_customer(id, name, address).await;
    }

    /// Seed an item into the stub backend.
    pub async fn seed_item(&self, id: i32, description: &str, price: &str, stock: u32) {
        self.backend.seed_item(id, description, price, stock).await;
    }
}

fn test_config(backend_addr: SocketAddr) -> PosConfig {
    PosConfig {
        backend_url: url::Url::parse(&format!("http://{backend_addr}")).expect("valid url"),
        backend_token: None,
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        base_url: "http://localhost:4000".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
