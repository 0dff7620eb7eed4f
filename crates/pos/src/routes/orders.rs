//! Orders page: the new-sale screen with the session-held cart.
//!
//! Cart operations are HTMX fragments that re-render the cart panel from
//! session state. Validation failures render the fragment with an inline
//! error and leave the cart unchanged; only `POST /orders/place` talks to
//! the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tillhouse_core::cart::{CartError, DiscountMode, Totals};
use tillhouse_core::{Customer, CustomerId, Item, ItemId, OrderNumber, OrderPayload};

use crate::error::Result;
use crate::filters;
use crate::models::{Flash, OrderDraft, keys};
use crate::routes::FlashView;
use crate::state::AppState;

// =============================================================================
// View types
// =============================================================================

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub item_id: i32,
    pub description: String,
    pub quantity: u32,
    pub unit_price: tillhouse_core::Money,
    pub total: tillhouse_core::Money,
}

/// Cart panel display data (table, pricing controls, totals).
#[derive(Debug, Clone)]
pub struct CartPanelView {
    pub lines: Vec<CartLineView>,
    pub line_count: usize,
    pub totals: Totals,
    pub discount_mode: &'static str,
    pub discount_value: String,
    pub tax_enabled: bool,
    pub error: Option<String>,
}

fn cart_panel(draft: &OrderDraft, error: Option<String>) -> CartPanelView {
    CartPanelView {
        lines: draft
            .cart
            .lines()
            .iter()
            .map(|l| CartLineView {
                item_id: l.item_id.as_i32(),
                description: l.description.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
                total: l.total(),
            })
            .collect(),
        line_count: draft.cart.len(),
        totals: draft.totals(),
        discount_mode: draft.discount_mode.as_str(),
        discount_value: draft.discount_value.clone(),
        tax_enabled: draft.tax_enabled,
        error,
    }
}

// =============================================================================
// Session helpers
// =============================================================================

async fn get_draft(session: &Session) -> Result<OrderDraft> {
    Ok(session
        .get::<OrderDraft>(keys::ORDER_DRAFT)
        .await?
        .unwrap_or_default())
}

async fn save_draft(session: &Session, draft: &OrderDraft) -> Result<()> {
    session.insert(keys::ORDER_DRAFT, draft).await?;
    Ok(())
}

async fn order_seq(session: &Session) -> Result<u32> {
    Ok(session.get::<u32>(keys::ORDER_SEQ).await?.unwrap_or(1))
}

// =============================================================================
// Templates
// =============================================================================

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersPageTemplate {
    pub toasts: Vec<FlashView>,
    pub order_number: String,
    pub order_date: String,
    /// Inline error rendered in the page header (e.g. "Cart empty").
    pub error: Option<String>,
    pub customers: Vec<Customer>,
    pub items: Vec<Item>,
    pub panel: CartPanelView,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub panel: CartPanelView,
}

/// Customer detail card fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/customer_card.html")]
pub struct CustomerCardTemplate {
    pub customer: Option<Customer>,
}

/// Item price/stock card fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/item_card.html")]
pub struct ItemCardTemplate {
    pub item: Option<Item>,
}

// =============================================================================
// Forms & queries
// =============================================================================

/// Add-to-cart form data. `qty` stays raw so "not a number" validates
/// the same way an empty input does.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: Option<String>,
    pub qty: Option<String>,
}

/// Line mutation form data (increment/decrement/remove).
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub item_id: i32,
}

/// Pricing controls form data.
#[derive(Debug, Deserialize)]
pub struct PricingForm {
    pub discount_mode: DiscountMode,
    #[serde(default)]
    pub discount_value: String,
    /// Checkbox: present ("on") when checked, absent otherwise.
    pub tax_enabled: Option<String>,
}

/// Detail card queries (select values come through hx-include, possibly "").
#[derive(Debug, Deserialize)]
pub struct CustomerCardQuery {
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemCardQuery {
    pub item_id: Option<String>,
}

/// Place-order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub customer_id: Option<String>,
}

fn parse_id(raw: Option<&String>) -> Option<i32> {
    raw.and_then(|s| s.trim().parse::<i32>().ok())
}

// =============================================================================
// Page
// =============================================================================

async fn render_page(
    state: &AppState,
    session: &Session,
    error: Option<String>,
    extra_toast: Option<FlashView>,
) -> Result<OrdersPageTemplate> {
    let mut toasts: Vec<FlashView> = Flash::take(session).await.map(Into::into).into_iter().collect();
    if let Some(toast) = extra_toast {
        toasts.push(toast);
    }

    let customers = match state.backend().list_customers().await {
        Ok(customers) => customers,
        Err(e) => {
            tracing::error!("Failed to load customers: {e}");
            toasts.push(FlashView::load_error("Failed to load customers"));
            vec![]
        }
    };

    let items = match state.backend().list_items().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load items: {e}");
            toasts.push(FlashView::load_error("Failed to load items"));
            vec![]
        }
    };

    let draft = get_draft(session).await?;
    let seq = order_seq(session).await?;

    Ok(OrdersPageTemplate {
        toasts,
        order_number: OrderNumber(seq).to_string(),
        order_date: chrono::Local::now().date_naive().to_string(),
        error,
        customers,
        items,
        panel: cart_panel(&draft, None),
    })
}

/// New-sale page.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<OrdersPageTemplate> {
    render_page(&state, &session, None, None).await
}

// =============================================================================
// Cart fragments (HTMX)
// =============================================================================

/// Add an item to the cart.
///
/// Validation order matches the inline copy: items loaded, item selected,
/// qty parses positive, stock not exceeded.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<CartPanelTemplate> {
    let mut draft = get_draft(&session).await?;

    let items = match state.backend().list_items().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load items for add-to-cart: {e}");
            return Ok(CartPanelTemplate {
                panel: cart_panel(&draft, Some("Failed to load items".to_string())),
            });
        }
    };

    let error = validate_and_add(&mut draft, &items, &form);
    if error.is_none() {
        save_draft(&session, &draft).await?;
    }

    Ok(CartPanelTemplate {
        panel: cart_panel(&draft, error),
    })
}

/// Apply the add-to-cart validation chain, mutating the draft on success.
fn validate_and_add(draft: &mut OrderDraft, items: &[Item], form: &AddToCartForm) -> Option<String> {
    if items.is_empty() {
        return Some("No items available. Add items first.".to_string());
    }

    let Some(item) = parse_id(form.item_id.as_ref())
        .map(ItemId::new)
        .and_then(|id| items.iter().find(|it| it.id == id))
    else {
        return Some("Select an item.".to_string());
    };

    let Some(qty) = form
        .qty
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|q| *q > 0)
    else {
        return Some("Enter a valid qty.".to_string());
    };

    let merging = draft.cart.line(item.id).is_some();
    match draft.cart.add(item, qty) {
        Ok(()) => None,
        Err(CartError::InvalidQuantity) => Some("Enter a valid qty.".to_string()),
        Err(CartError::InsufficientStock { .. }) => {
            // Same rule, but the merge case keeps its own copy.
            if merging {
                Some("Exceeds stock".to_string())
            } else {
                Some("Not enough stock.".to_string())
            }
        }
    }
}

/// Increase a line's quantity by one, bounded by stock.
#[instrument(skip(state, session))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LineForm>,
) -> Result<CartPanelTemplate> {
    let mut draft = get_draft(&session).await?;
    let item_id = ItemId::new(form.item_id);

    let items = match state.backend().list_items().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load items for increment: {e}");
            return Ok(CartPanelTemplate {
                panel: cart_panel(&draft, Some("Failed to load items".to_string())),
            });
        }
    };
    // An item missing from the snapshot no longer exists; leave the line be.
    let error = match items.iter().find(|it| it.id == item_id) {
        None => None,
        Some(item) => match draft.cart.increment(item) {
            Ok(()) => {
                save_draft(&session, &draft).await?;
                None
            }
            Err(_) => Some("Stock limit".to_string()),
        },
    };

    Ok(CartPanelTemplate {
        panel: cart_panel(&draft, error),
    })
}

/// Decrease a line's quantity by one; the line is removed at zero.
#[instrument(skip(session))]
pub async fn decrement(session: Session, Form(form): Form<LineForm>) -> Result<CartPanelTemplate> {
    let mut draft = get_draft(&session).await?;
    draft.cart.decrement(ItemId::new(form.item_id));
    save_draft(&session, &draft).await?;

    Ok(CartPanelTemplate {
        panel: cart_panel(&draft, None),
    })
}

/// Remove a line unconditionally.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<LineForm>) -> Result<CartPanelTemplate> {
    let mut draft = get_draft(&session).await?;
    draft.cart.remove(ItemId::new(form.item_id));
    save_draft(&session, &draft).await?;

    Ok(CartPanelTemplate {
        panel: cart_panel(&draft, None),
    })
}

/// Update the pricing controls (discount mode/value, tax toggle).
#[instrument(skip(session))]
pub async fn pricing(session: Session, Form(form): Form<PricingForm>) -> Result<CartPanelTemplate> {
    let mut draft = get_draft(&session).await?;
    draft.discount_mode = form.discount_mode;
    draft.discount_value = form.discount_value;
    draft.tax_enabled = form.tax_enabled.is_some();
    save_draft(&session, &draft).await?;

    Ok(CartPanelTemplate {
        panel: cart_panel(&draft, None),
    })
}

// =============================================================================
// Detail cards
// =============================================================================

/// Customer detail card for the current select value.
#[instrument(skip(state))]
pub async fn customer_card(
    State(state): State<AppState>,
    Query(query): Query<CustomerCardQuery>,
) -> Result<CustomerCardTemplate> {
    let customer = match parse_id(query.customer_id.as_ref()) {
        None => None,
        Some(id) => {
            let id = CustomerId::new(id);
            state
                .backend()
                .list_customers()
                .await
                .unwrap_or_default()
                .into_iter()
                .find(|c| c.id == id)
        }
    };

    Ok(CustomerCardTemplate { customer })
}

/// Item price/stock card for the current select value.
#[instrument(skip(state))]
pub async fn item_card(
    State(state): State<AppState>,
    Query(query): Query<ItemCardQuery>,
) -> Result<ItemCardTemplate> {
    let item = match parse_id(query.item_id.as_ref()) {
        None => None,
        Some(id) => {
            let id = ItemId::new(id);
            state
                .backend()
                .list_items()
                .await
                .unwrap_or_default()
                .into_iter()
                .find(|it| it.id == id)
        }
    };

    Ok(ItemCardTemplate { item })
}

// =============================================================================
// Order placement
// =============================================================================

/// Place the order.
///
/// Empty cart and missing customer are rejected before any network call.
/// On success: clear the draft, bump the sequence, invalidate the item
/// snapshot (done by the client), flash, redirect (PRG). On backend failure
/// the draft is preserved for a manual retry.
#[instrument(skip(state, session))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response> {
    let draft = get_draft(&session).await?;

    if draft.cart.is_empty() {
        let page = render_page(&state, &session, Some("Cart empty".to_string()), None).await?;
        return Ok(page.into_response());
    }

    let customers = state.backend().list_customers().await.unwrap_or_default();
    let Some(customer) = parse_id(form.customer_id.as_ref())
        .map(CustomerId::new)
        .and_then(|id| customers.into_iter().find(|c| c.id == id))
    else {
        let page = render_page(&state, &session, Some("Select customer".to_string()), None).await?;
        return Ok(page.into_response());
    };

    let seq = order_seq(&session).await?;
    let payload = OrderPayload {
        order_id: seq,
        date: chrono::Local::now().date_naive(),
        customer_id: customer.id,
        order_details: draft.cart.order_details(),
    };

    match state.backend().place_order(&payload).await {
        Ok(()) => {
            session.remove::<OrderDraft>(keys::ORDER_DRAFT).await?;
            session.insert(keys::ORDER_SEQ, seq + 1).await?;
            Flash::success(format!("Order {} placed", OrderNumber(seq)))
                .set(&session)
                .await?;
            Ok(Redirect::to("/orders").into_response())
        }
        Err(e) => {
            tracing::error!(order_id = seq, "Order placement failed: {e}");
            let page = render_page(
                &state,
                &session,
                Some("Order failed.".to_string()),
                Some(FlashView::load_error("Order failed")),
            )
            .await?;
            Ok(page.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use tillhouse_core::Money;

    use super::*;

    fn item(id: i32, price: &str, stock: u32) -> Item {
        Item {
            id: ItemId::new(id),
            description: format!("Item {id}"),
            unit_price: Money::new(Decimal::from_str(price).expect("decimal")),
            qty_on_hand: stock,
        }
    }

    fn form(item_id: Option<&str>, qty: Option<&str>) -> AddToCartForm {
        AddToCartForm {
            item_id: item_id.map(String::from),
            qty: qty.map(String::from),
        }
    }

    #[test]
    fn test_add_requires_items_loaded() {
        let mut draft = OrderDraft::default();
        let error = validate_and_add(&mut draft, &[], &form(Some("1"), Some("1")));
        assert_eq!(error.as_deref(), Some("No items available. Add items first."));
    }

    #[test]
    fn test_add_requires_selection() {
        let mut draft = OrderDraft::default();
        let items = vec![item(1, "10.00", 5)];

        for raw in [None, Some(""), Some("nope"), Some("99")] {
            let error = validate_and_add(&mut draft, &items, &form(raw, Some("1")));
            assert_eq!(error.as_deref(), Some("Select an item."), "{raw:?}");
        }
        assert!(draft.cart.is_empty());
    }

    #[test]
    fn test_add_requires_valid_qty() {
        let mut draft = OrderDraft::default();
        let items = vec![item(1, "10.00", 5)];

        for raw in [None, Some(""), Some("abc"), Some("0"), Some("-2")] {
            let error = validate_and_add(&mut draft, &items, &form(Some("1"), raw));
            assert_eq!(error.as_deref(), Some("Enter a valid qty."), "{raw:?}");
        }
        assert!(draft.cart.is_empty());
    }

    #[test]
    fn test_add_stock_messages_differ_for_merge() {
        let mut draft = OrderDraft::default();
        let items = vec![item(1, "10.00", 3)];

        let error = validate_and_add(&mut draft, &items, &form(Some("1"), Some("4")));
        assert_eq!(error.as_deref(), Some("Not enough stock."));

        assert!(validate_and_add(&mut draft, &items, &form(Some("1"), Some("2"))).is_none());
        let error = validate_and_add(&mut draft, &items, &form(Some("1"), Some("2")));
        assert_eq!(error.as_deref(), Some("Exceeds stock"));
        // Rejected merge leaves the line unchanged.
        assert_eq!(draft.cart.line(ItemId::new(1)).expect("line").quantity, 2);
    }

    #[test]
    fn test_cart_panel_reflects_totals() {
        let mut draft = OrderDraft::default();
        let items = vec![item(1, "10.00", 10)];
        assert!(validate_and_add(&mut draft, &items, &form(Some("1"), Some("2"))).is_none());
        draft.discount_value = "10".to_string();

        let panel = cart_panel(&draft, None);
        assert_eq!(panel.line_count, 1);
        assert_eq!(
            panel.totals.grand_total,
            Money::new(Decimal::from_str("18.00").expect("decimal"))
        );
    }
}
