//! Session middleware configuration.
//!
//! Sessions use the in-memory tower-sessions store: the POS keeps no local
//! database (the backend owns all persistence) and carts are transient by
//! design, so losing sessions on restart only drops unfinished drafts.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::PosConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "till_session";

/// Session expiry time in seconds (12 hours; one register shift).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &PosConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
