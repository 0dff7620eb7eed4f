//! Cart pricing and validation engine.
//!
//! The cart is a transient, ordered collection of line items keyed by item
//! identifier. Mutations validate against the item snapshot's stock and never
//! partially apply; totals are a pure function of cart state and the pricing
//! form (discount mode/value, tax toggle).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Item, ItemId, Money, OrderDetail};

/// Fixed tax rate applied to the post-discount base when enabled (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Validation failure for a cart mutation. The cart is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity was zero (or unparsable upstream).
    #[error("quantity must be a positive number")]
    InvalidQuantity,

    /// The requested quantity exceeds the item's available stock.
    #[error("requested {requested} exceeds available stock of {available}")]
    InsufficientStock { requested: u32, available: u32 },
}

/// One entry in the cart, referencing one item at a frozen price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    /// Denormalized copy of the item description at add time.
    pub description: String,
    /// Unit price frozen at add time; later item edits do not affect it.
    pub unit_price: Money,
    /// Always >= 1; a line driven to zero is removed.
    pub quantity: u32,
}

impl CartLine {
    /// Line total (quantity x frozen unit price).
    #[must_use]
    pub fn total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// An ordered sequence of cart lines, one per distinct item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for an item, if present.
    #[must_use]
    pub fn line(&self, item_id: ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `qty` of an item, merging into an existing line for that item.
    ///
    /// The merged quantity is validated against `item.qty_on_hand`; on
    /// rejection the cart is unchanged (no partial apply). The unit price is
    /// frozen the first time the item enters the cart.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` if `qty` is zero, `InsufficientStock` if the merged
    /// quantity would exceed available stock.
    pub fn add(&mut self, item: &Item, qty: u32) -> Result<(), CartError> {
        if qty == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let current = self.line(item.id).map_or(0, |l| l.quantity);
        // Saturating add keeps an overflowing merge in the rejected range.
        let merged = current.saturating_add(qty);
        if merged > item.qty_on_hand {
            return Err(CartError::InsufficientStock {
                requested: merged,
                available: item.qty_on_hand,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) {
            line.quantity = merged;
        } else {
            self.lines.push(CartLine {
                item_id: item.id,
                description: item.description.clone(),
                unit_price: item.unit_price,
                quantity: qty,
            });
        }
        Ok(())
    }

    /// Increase an item's line quantity by one.
    ///
    /// A no-op when the item has no line.
    ///
    /// # Errors
    ///
    /// `InsufficientStock` when the increment would exceed available stock;
    /// the line is left unchanged.
    pub fn increment(&mut self, item: &Item) -> Result<(), CartError> {
        let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id) else {
            return Ok(());
        };

        let bumped = line.quantity.saturating_add(1);
        if bumped > item.qty_on_hand {
            return Err(CartError::InsufficientStock {
                requested: bumped,
                available: item.qty_on_hand,
            });
        }
        line.quantity = bumped;
        Ok(())
    }

    /// Decrease an item's line quantity by one, removing the line when it
    /// reaches zero. A no-op for a nonexistent line.
    pub fn decrement(&mut self, item_id: ItemId) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item_id) {
            line.quantity -= 1;
        }
        self.lines.retain(|l| l.quantity > 0);
    }

    /// Remove an item's line unconditionally. A no-op if absent.
    pub fn remove(&mut self, item_id: ItemId) {
        self.lines.retain(|l| l.item_id != item_id);
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// The order payload details for the current cart state.
    #[must_use]
    pub fn order_details(&self) -> Vec<OrderDetail> {
        self.lines
            .iter()
            .map(|l| OrderDetail {
                item_id: l.item_id,
                qty: l.quantity,
                unit_price: l.unit_price,
            })
            .collect()
    }
}

/// Discount entry mode: percentage of subtotal or fixed currency amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountMode {
    #[default]
    Percent,
    Fixed,
}

impl DiscountMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Fixed => "fixed",
        }
    }
}

/// Computed order totals. Pure output of [`Totals::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub grand_total: Money,
}

impl Totals {
    /// Compute subtotal, discount, tax, and grand total from cart state.
    ///
    /// A missing or non-positive discount value contributes nothing. The
    /// discount is clamped so it never exceeds the subtotal, which makes the
    /// taxable base `subtotal - discount` exactly, floored at zero net.
    #[must_use]
    pub fn compute(
        cart: &Cart,
        mode: DiscountMode,
        discount_value: Option<Decimal>,
        tax_enabled: bool,
    ) -> Self {
        let subtotal = cart.subtotal().amount();

        let discount = match discount_value {
            Some(v) if v > Decimal::ZERO => match mode {
                DiscountMode::Fixed => v.min(subtotal),
                DiscountMode::Percent => (subtotal * v / Decimal::ONE_HUNDRED).min(subtotal),
            },
            _ => Decimal::ZERO,
        };

        let taxable = (subtotal - discount).max(Decimal::ZERO);
        let tax = if tax_enabled {
            taxable * TAX_RATE
        } else {
            Decimal::ZERO
        };

        Self {
            subtotal: Money::new(subtotal),
            discount: Money::new(discount),
            tax: Money::new(tax),
            grand_total: Money::new(taxable + tax),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).expect("valid decimal"))
    }

    fn item(id: i32, price: &str, stock: u32) -> Item {
        Item {
            id: ItemId::new(id),
            description: format!("Item {id}"),
            unit_price: money(price),
            qty_on_hand: stock,
        }
    }

    #[test]
    fn test_add_within_stock_succeeds() {
        let mut cart = Cart::new();
        cart.add(&item(1, "10.00", 5), 3).expect("within stock");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(ItemId::new(1)).expect("line").quantity, 3);
    }

    #[test]
    fn test_add_zero_qty_rejected() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(&item(1, "10.00", 5), 0), Err(CartError::InvalidQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_exceeding_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        let it = item(1, "10.00", 5);
        cart.add(&it, 4).expect("within stock");

        let err = cart.add(&it, 2).expect_err("merge exceeds stock");
        assert_eq!(
            err,
            CartError::InsufficientStock {
                requested: 6,
                available: 5
            }
        );
        // No partial apply: quantity stays at the pre-merge value.
        assert_eq!(cart.line(it.id).expect("line").quantity, 4);
    }

    #[test]
    fn test_add_merges_into_existing_line() {
        let mut cart = Cart::new();
        let it = item(1, "10.00", 10);
        cart.add(&it, 2).expect("add");
        cart.add(&it, 3).expect("merge");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(it.id).expect("line").quantity, 5);
    }

    #[test]
    fn test_price_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut it = item(1, "10.00", 10);
        cart.add(&it, 1).expect("add");

        // A later price edit on the item does not touch the cart line.
        it.unit_price = money("99.00");
        cart.add(&it, 1).expect("merge");
        assert_eq!(cart.line(it.id).expect("line").unit_price, money("10.00"));
    }

    #[test]
    fn test_increment_respects_stock() {
        let mut cart = Cart::new();
        let it = item(1, "10.00", 2);
        cart.add(&it, 2).expect("add");

        let err = cart.increment(&it).expect_err("at stock limit");
        assert_eq!(
            err,
            CartError::InsufficientStock {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(cart.line(it.id).expect("line").quantity, 2);
    }

    #[test]
    fn test_increment_missing_line_is_noop() {
        let mut cart = Cart::new();
        cart.increment(&item(9, "1.00", 5)).expect("no-op");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let mut cart = Cart::new();
        let it = item(1, "10.00", 5);
        cart.add(&it, 1).expect("add");

        cart.decrement(it.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_nonexistent_line_is_noop() {
        let mut cart = Cart::new();
        cart.add(&item(1, "10.00", 5), 2).expect("add");
        cart.decrement(ItemId::new(99));
        assert_eq!(cart.line(ItemId::new(1)).expect("line").quantity, 2);
    }

    #[test]
    fn test_remove_is_unconditional() {
        let mut cart = Cart::new();
        let it = item(1, "10.00", 5);
        cart.add(&it, 5).expect("add");
        cart.remove(it.id);
        assert!(cart.is_empty());

        // Removing again is a no-op.
        cart.remove(it.id);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_example_ten_percent_discount() {
        // [{qty:2, price:10}], 10% discount, tax off
        let mut cart = Cart::new();
        cart.add(&item(1, "10.00", 10), 2).expect("add");

        let totals = Totals::compute(
            &cart,
            DiscountMode::Percent,
            Some(Decimal::from(10)),
            false,
        );
        assert_eq!(totals.subtotal, money("20.00"));
        assert_eq!(totals.discount, money("2.00"));
        assert_eq!(totals.tax, Money::ZERO);
        assert_eq!(totals.grand_total, money("18.00"));
    }

    #[test]
    fn test_totals_fixed_discount_clamped_to_subtotal() {
        // subtotal 100, fixed discount 150 -> clamped to 100, grand total 0
        let mut cart = Cart::new();
        cart.add(&item(1, "100.00", 10), 1).expect("add");

        let totals = Totals::compute(
            &cart,
            DiscountMode::Fixed,
            Some(Decimal::from(150)),
            true,
        );
        assert_eq!(totals.discount, money("100.00"));
        assert_eq!(totals.tax, Money::ZERO);
        assert_eq!(totals.grand_total, Money::ZERO);
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let mut cart = Cart::new();
        cart.add(&item(1, "25.00", 10), 2).expect("add");

        for (mode, value) in [
            (DiscountMode::Percent, "250"),
            (DiscountMode::Percent, "100"),
            (DiscountMode::Fixed, "1000000"),
            (DiscountMode::Fixed, "49.99"),
        ] {
            let totals = Totals::compute(
                &cart,
                mode,
                Some(Decimal::from_str(value).expect("decimal")),
                false,
            );
            assert!(totals.discount <= totals.subtotal, "{mode:?} {value}");
        }
    }

    #[test]
    fn test_non_positive_discount_contributes_nothing() {
        let mut cart = Cart::new();
        cart.add(&item(1, "10.00", 10), 1).expect("add");

        for value in [None, Some(Decimal::ZERO), Some(Decimal::from(-5))] {
            let totals = Totals::compute(&cart, DiscountMode::Fixed, value, false);
            assert_eq!(totals.discount, Money::ZERO);
            assert_eq!(totals.grand_total, totals.subtotal);
        }
    }

    #[test]
    fn test_grand_total_identity() {
        // grand_total = subtotal - discount + tax, exactly
        let mut cart = Cart::new();
        cart.add(&item(1, "13.37", 20), 3).expect("add");
        cart.add(&item(2, "0.99", 20), 7).expect("add");

        for tax_enabled in [false, true] {
            for (mode, value) in [
                (DiscountMode::Percent, Some(Decimal::from(15))),
                (DiscountMode::Fixed, Some(Decimal::from(5))),
                (DiscountMode::Percent, None),
            ] {
                let t = Totals::compute(&cart, mode, value, tax_enabled);
                assert_eq!(t.grand_total, t.subtotal - t.discount + t.tax);
            }
        }
    }

    #[test]
    fn test_tax_applies_to_discounted_base() {
        let mut cart = Cart::new();
        cart.add(&item(1, "100.00", 10), 1).expect("add");

        let totals = Totals::compute(
            &cart,
            DiscountMode::Percent,
            Some(Decimal::from(50)),
            true,
        );
        // 8% of the 50.00 taxable base, not of the 100.00 subtotal.
        assert_eq!(totals.tax, money("4.00"));
        assert_eq!(totals.grand_total, money("54.00"));
    }

    #[test]
    fn test_order_details_mirror_lines() {
        let mut cart = Cart::new();
        cart.add(&item(1, "10.00", 10), 2).expect("add");
        cart.add(&item(2, "5.00", 10), 1).expect("add");

        let details = cart.order_details();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].item_id, ItemId::new(1));
        assert_eq!(details[0].qty, 2);
        assert_eq!(details[0].unit_price, money("10.00"));
    }
}
