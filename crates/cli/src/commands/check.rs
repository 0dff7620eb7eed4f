//! Backend connectivity check.

use tracing::info;

use tillhouse_pos::backend::BackendClient;
use tillhouse_pos::config::PosConfig;

/// Ping the backend and report record counts.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the backend is
/// unreachable.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = PosConfig::from_env()?;
    let backend = BackendClient::new(&config);

    backend.ping().await?;
    info!("Backend reachable at {}", config.backend_url);

    let customers = backend.list_customers().await?;
    let items = backend.list_items().await?;

    info!("  Customers: {}", customers.len());
    info!("  Items: {}", items.len());

    Ok(())
}
