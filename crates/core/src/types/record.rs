//! Backend-owned domain records.

use serde::{Deserialize, Serialize};

use super::{CustomerId, ItemId, Money};

/// A customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: String,
}

/// Payload for creating a customer (backend assigns the ID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
}

/// An inventory item record.
///
/// `qty_on_hand` is the backend-tracked available stock; the POS caches the
/// item list as a read-mostly snapshot and refreshes it after any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub description: String,
    pub unit_price: Money,
    pub qty_on_hand: u32,
}

/// Payload for creating an item (backend assigns the ID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub description: String,
    pub unit_price: Money,
    pub qty_on_hand: u32,
}
