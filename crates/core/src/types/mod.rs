//! Shared domain types for Tillhouse POS.
//!
//! All wire-facing types serialize with camelCase field names to match the
//! backend REST contract (`unitPrice`, `qtyOnHand`, `orderDetails`, ...).

mod id;
mod money;
mod order;
mod record;

pub use id::{CustomerId, ItemId, OrderId};
pub use money::Money;
pub use order::{OrderDetail, OrderNumber, OrderPayload};
pub use record::{Customer, Item, NewCustomer, NewItem};
