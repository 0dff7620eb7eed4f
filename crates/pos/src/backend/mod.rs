//! REST client for the external POS backend.
//!
//! The backend owns all persistence (customers, items, orders). This client
//! wraps `reqwest` with typed per-operation methods and keeps the item list
//! as a moka-cached read-mostly snapshot (60 second TTL) that is explicitly
//! invalidated after any item mutation and after successful order placement,
//! so stock reflects the server-side decrement.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use tillhouse_core::{Customer, CustomerId, Item, ItemId, NewCustomer, NewItem, OrderPayload};

use crate::config::PosConfig;

/// How long a fetched item snapshot stays fresh without invalidation.
const ITEMS_SNAPSHOT_TTL: Duration = Duration::from_secs(60);

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend returned a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Client for the backend REST API.
///
/// Cheap to clone; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    items_cache: Cache<(), Vec<Item>>,
}

impl BackendClient {
    /// Create a new backend client from configuration.
    #[must_use]
    pub fn new(config: &PosConfig) -> Self {
        Self::with_base_url(
            config.backend_url.as_str(),
            config.backend_token.clone(),
        )
    }

    /// Create a client against an explicit base URL (used by tests).
    #[must_use]
    pub fn with_base_url(base_url: &str, token: Option<SecretString>) -> Self {
        let items_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(ITEMS_SNAPSHOT_TTL)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                token,
                items_cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and return the response body on success.
    ///
    /// Handles rate limiting (429 + `Retry-After`), 404, and non-success
    /// statuses with a body excerpt for diagnostics.
    async fn execute(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, BackendError> {
        let request = match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(path.to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %path,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let body = self
            .execute(path, self.inner.client.get(self.url(path)))
            .await?;
        parse_json(path, &body)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, BackendError> {
        let body = self
            .execute(path, self.inner.client.post(self.url(path)).json(payload))
            .await?;
        parse_json(path, &body)
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, BackendError> {
        let body = self
            .execute(path, self.inner.client.put(self.url(path)).json(payload))
            .await?;
        parse_json(path, &body)
    }

    async fn delete(&self, path: &str) -> Result<(), BackendError> {
        self.execute(path, self.inner.client.delete(self.url(path)))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// List all customers. Fetched per request; no snapshot semantics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
        self.get_json("/api/customers").await
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, customer), fields(name = %customer.name))]
    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, BackendError> {
        self.post_json("/api/customers", customer).await
    }

    /// Update an existing customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist or the request fails.
    #[instrument(skip(self, customer), fields(id = %id))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        customer: &NewCustomer,
    ) -> Result<Customer, BackendError> {
        self.put_json(&format!("/api/customers/{id}"), customer)
            .await
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), BackendError> {
        self.delete(&format!("/api/customers/{id}")).await
    }

    // =========================================================================
    // Items (cached snapshot)
    // =========================================================================

    /// Get the item snapshot, fetching from the backend on a cache miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Item>, BackendError> {
        if let Some(items) = self.inner.items_cache.get(&()).await {
            debug!("Cache hit for item snapshot");
            return Ok(items);
        }

        let items: Vec<Item> = self.get_json("/api/items").await?;
        self.inner.items_cache.insert((), items.clone()).await;
        Ok(items)
    }

    /// Create an item. Invalidates the item snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, item), fields(description = %item.description))]
    pub async fn create_item(&self, item: &NewItem) -> Result<Item, BackendError> {
        let created = self.post_json("/api/items", item).await?;
        self.invalidate_items().await;
        Ok(created)
    }

    /// Update an existing item. Invalidates the item snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist or the request fails.
    #[instrument(skip(self, item), fields(id = %id))]
    pub async fn update_item(&self, id: ItemId, item: &NewItem) -> Result<Item, BackendError> {
        let updated = self.put_json(&format!("/api/items/{id}"), item).await?;
        self.invalidate_items().await;
        Ok(updated)
    }

    /// Delete an item. Invalidates the item snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_item(&self, id: ItemId) -> Result<(), BackendError> {
        self.delete(&format!("/api/items/{id}")).await?;
        self.invalidate_items().await;
        Ok(())
    }

    /// Drop the cached item snapshot so the next read refetches stock.
    pub async fn invalidate_items(&self) {
        self.inner.items_cache.invalidate(&()).await;
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an immutable order payload. Never cached.
    ///
    /// On success the item snapshot is invalidated so the next render shows
    /// the server-side stock decrement.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the caller keeps its cart state
    /// for a manual retry.
    #[instrument(skip(self, payload), fields(order_id = payload.order_id))]
    pub async fn place_order(&self, payload: &OrderPayload) -> Result<(), BackendError> {
        self.execute(
            "/api/orders",
            self.inner.client.post(self.url("/api/orders")).json(payload),
        )
        .await?;
        self.invalidate_items().await;
        Ok(())
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Readiness probe against the backend health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.execute("/api/health", self.inner.client.get(self.url("/api/health")))
            .await?;
        Ok(())
    }
}

fn parse_json<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            path = %path,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}
