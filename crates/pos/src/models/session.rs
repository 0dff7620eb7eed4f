//! Session-stored types.
//!
//! The cart and its pricing form state live in the session as an
//! [`OrderDraft`] for the duration of building one order. The draft is
//! discarded on successful placement; the order sequence survives it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use tillhouse_core::cart::{Cart, DiscountMode, Totals};

/// The session-held cart plus the pricing controls of the Orders page.
///
/// `discount_value` keeps the raw form input so an empty or non-numeric
/// entry renders back exactly as typed; it only becomes a number inside
/// [`OrderDraft::totals`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub cart: Cart,
    pub discount_mode: DiscountMode,
    pub discount_value: String,
    pub tax_enabled: bool,
}

impl OrderDraft {
    /// The discount value as a number, if the raw input parses.
    #[must_use]
    pub fn discount_decimal(&self) -> Option<Decimal> {
        self.discount_value.trim().parse::<Decimal>().ok()
    }

    /// Current totals for the draft.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::compute(
            &self.cart,
            self.discount_mode,
            self.discount_decimal(),
            self.tax_enabled,
        )
    }
}

/// Severity of a one-shot flash toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot toast message, taken from the session on the next render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// Queue this flash for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the write.
    pub async fn set(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::FLASH, self).await
    }

    /// Take and clear the pending flash, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

/// Session keys for POS state.
pub mod keys {
    /// Key for the in-progress order draft (cart + pricing form).
    pub const ORDER_DRAFT: &str = "order_draft";

    /// Key for the next order sequence number (defaults to 1).
    pub const ORDER_SEQ: &str = "order_seq";

    /// Key for the one-shot flash toast.
    pub const FLASH: &str = "flash";
}
