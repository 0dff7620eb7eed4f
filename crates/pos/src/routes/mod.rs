//! HTTP route handlers for the POS pages.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Redirect to /orders
//!
//! # Orders (cart fragments are HTMX)
//! GET  /orders                   - New sale page
//! POST /orders/cart/add          - Add line (returns cart panel fragment)
//! POST /orders/cart/increment    - +1 on a line
//! POST /orders/cart/decrement    - -1 on a line (removes at zero)
//! POST /orders/cart/remove       - Remove a line
//! POST /orders/pricing           - Discount mode/value + tax toggle
//! GET  /orders/customer-card     - Customer detail card fragment
//! GET  /orders/item-card         - Item price/stock card fragment
//! POST /orders/place             - Place the order (PRG on success)
//!
//! # Customers
//! GET  /customers                - List + form (query: q, edit)
//! POST /customers                - Create
//! POST /customers/{id}           - Update
//! POST /customers/{id}/delete    - Delete
//!
//! # Items
//! GET  /items                    - Inventory grid + form (query: q, sort, edit)
//! POST /items                    - Create
//! POST /items/{id}               - Update
//! POST /items/{id}/delete        - Delete
//! ```

pub mod customers;
pub mod items;
pub mod orders;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::models::{Flash, FlashLevel};
use crate::state::AppState;

/// Toast display data for templates.
#[derive(Debug, Clone)]
pub struct FlashView {
    pub level: &'static str,
    pub message: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        Self {
            level: match flash.level {
                FlashLevel::Success => "success",
                FlashLevel::Error => "error",
            },
            message: flash.message,
        }
    }
}

impl FlashView {
    /// Toast for a failed backend load; the page renders with an empty list.
    #[must_use]
    pub fn load_error(message: &str) -> Self {
        Self {
            level: "error",
            message: message.to_string(),
        }
    }
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/cart/add", post(orders::add))
        .route("/cart/increment", post(orders::increment))
        .route("/cart/decrement", post(orders::decrement))
        .route("/cart/remove", post(orders::remove))
        .route("/pricing", post(orders::pricing))
        .route("/customer-card", get(orders::customer_card))
        .route("/item-card", get(orders::item_card))
        .route("/place", post(orders::place))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index).post(customers::create))
        .route("/{id}", post(customers::update))
        .route("/{id}/delete", post(customers::delete))
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::index).post(items::create))
        .route("/{id}", post(items::update))
        .route("/{id}/delete", post(items::delete))
}

/// Create all routes for the POS.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/orders") }))
        .nest("/orders", order_routes())
        .nest("/customers", customer_routes())
        .nest("/items", item_routes())
}
