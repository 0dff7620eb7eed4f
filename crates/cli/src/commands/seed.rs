//! Seed the backend with demo customers and items.
//!
//! Reads a YAML file, validates it fully before any network call, then
//! creates the records one by one through the backend REST API. Failures on
//! individual records are logged and counted rather than aborting the run.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use tillhouse_core::{NewCustomer, NewItem};
use tillhouse_pos::backend::BackendClient;
use tillhouse_pos::config::PosConfig;

/// Seed file contents.
///
/// ```yaml
/// customers:
///   - name: Asha Perera
///     address: 12 Lake Rd, Kandy
/// items:
///   - description: Black Tea 500g
///     unitPrice: "450.00"
///     qtyOnHand: 12
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub customers: Vec<NewCustomer>,
    #[serde(default)]
    pub items: Vec<NewItem>,
}

/// Validate seed data, returning all problems found.
fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, customer) in seed.customers.iter().enumerate() {
        if customer.name.trim().is_empty() {
            errors.push(format!("customers[{i}]: name is empty"));
        }
        if customer.address.trim().is_empty() {
            errors.push(format!("customers[{i}]: address is empty"));
        }
    }

    for (i, item) in seed.items.iter().enumerate() {
        if item.description.trim().is_empty() {
            errors.push(format!("items[{i}]: description is empty"));
        }
        if !item.unit_price.is_positive() {
            errors.push(format!("items[{i}]: unitPrice must be positive"));
        }
    }

    errors
}

/// Seed the backend from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, configuration cannot
/// be loaded, or every record in a section fails to insert.
pub async fn run(
    file_path: &str,
    customers_only: bool,
    items_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data");

    // Read and validate the YAML before touching the network
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!(
        customers = seed.customers.len(),
        items = seed.items.len(),
        "Seed file validated"
    );

    let config = PosConfig::from_env()?;
    let backend = BackendClient::new(&config);

    let mut inserted = 0usize;
    let mut failed = 0usize;

    if !items_only {
        for customer in &seed.customers {
            match backend.create_customer(customer).await {
                Ok(created) => {
                    inserted += 1;
                    info!(id = %created.id, name = %created.name, "Customer created");
                }
                Err(e) => {
                    failed += 1;
                    error!(name = %customer.name, "Customer insert failed: {e}");
                }
            }
        }
    }

    if !customers_only {
        for item in &seed.items {
            match backend.create_item(item).await {
                Ok(created) => {
                    inserted += 1;
                    info!(id = %created.id, description = %created.description, "Item created");
                }
                Err(e) => {
                    failed += 1;
                    error!(description = %item.description, "Item insert failed: {e}");
                }
            }
        }
    }

    info!("Seeding complete!");
    info!("  Records inserted: {inserted}");
    info!("  Records failed: {failed}");

    if inserted == 0 && failed > 0 {
        return Err("all inserts failed".into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_seed_yaml() {
        let yaml = r#"
customers:
  - name: Asha Perera
    address: 12 Lake Rd, Kandy
items:
  - description: Black Tea 500g
    unitPrice: "450.00"
    qtyOnHand: 12
  - description: Chocolate Biscuit
    unitPrice: 120.5
    qtyOnHand: 3
"#;
        let seed: SeedFile = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(seed.customers.len(), 1);
        assert_eq!(seed.items.len(), 2);
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let seed: SeedFile = serde_yaml::from_str("customers: []").expect("parse");
        assert!(seed.customers.is_empty());
        assert!(seed.items.is_empty());
    }

    #[test]
    fn test_validation_flags_bad_records() {
        let yaml = r#"
customers:
  - name: ""
    address: somewhere
items:
  - description: Tea
    unitPrice: "0"
    qtyOnHand: 1
"#;
        let seed: SeedFile = serde_yaml::from_str(yaml).expect("parse");
        let errors = validate(&seed);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("name is empty"));
        assert!(errors[1].contains("unitPrice must be positive"));
    }
}
