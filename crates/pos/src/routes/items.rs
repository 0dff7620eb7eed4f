//! Items page: inventory grid with search and sort, plus an upsert form.
//!
//! Same POST-redirect-GET shape as the customers page. The grid flags
//! low-stock items so the operator sees what needs restocking before a sale
//! bounces off the stock check.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tillhouse_core::{Item, ItemId, Money, NewItem};

use crate::error::Result;
use crate::filters;
use crate::models::Flash;
use crate::routes::FlashView;
use crate::state::AppState;

/// Stock level below which an item is flagged in the grid.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Sort order for the inventory grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    QtyAsc,
    QtyDesc,
}

impl SortKey {
    /// Parse the query-string value; unknown or empty values mean no sort.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "priceAsc" => Some(Self::PriceAsc),
            "priceDesc" => Some(Self::PriceDesc),
            "qtyAsc" => Some(Self::QtyAsc),
            "qtyDesc" => Some(Self::QtyDesc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "priceAsc",
            Self::PriceDesc => "priceDesc",
            Self::QtyAsc => "qtyAsc",
            Self::QtyDesc => "qtyDesc",
        }
    }
}

/// Case-insensitive substring filter on the description.
fn filter_items(items: Vec<Item>, q: &str) -> Vec<Item> {
    let needle = q.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|it| it.description.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort; equal keys keep their backend order.
fn sort_items(items: &mut [Item], sort: Option<SortKey>) {
    match sort {
        None => {}
        Some(SortKey::PriceAsc) => items.sort_by_key(|it| it.unit_price),
        Some(SortKey::PriceDesc) => items.sort_by(|a, b| b.unit_price.cmp(&a.unit_price)),
        Some(SortKey::QtyAsc) => items.sort_by_key(|it| it.qty_on_hand),
        Some(SortKey::QtyDesc) => items.sort_by(|a, b| b.qty_on_hand.cmp(&a.qty_on_hand)),
    }
}

/// Grid row display data.
#[derive(Debug, Clone)]
pub struct ItemRowView {
    pub id: i32,
    pub description: String,
    pub unit_price: Money,
    pub qty_on_hand: u32,
    pub low_stock: bool,
}

impl From<Item> for ItemRowView {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.as_i32(),
            description: item.description,
            unit_price: item.unit_price,
            qty_on_hand: item.qty_on_hand,
            low_stock: item.qty_on_hand < LOW_STOCK_THRESHOLD,
        }
    }
}

/// Upsert form display data. Price and qty stay raw so bad input renders
/// back as typed.
#[derive(Debug, Clone, Default)]
pub struct ItemFormView {
    pub id: Option<i32>,
    pub description: String,
    pub unit_price: String,
    pub qty_on_hand: String,
    pub error: Option<String>,
}

impl ItemFormView {
    fn editing(item: &Item) -> Self {
        Self {
            id: Some(item.id.as_i32()),
            description: item.description.clone(),
            unit_price: format!("{:.2}", item.unit_price),
            qty_on_hand: item.qty_on_hand.to_string(),
            error: None,
        }
    }
}

/// Items page template.
#[derive(Template, WebTemplate)]
#[template(path = "items/index.html")]
pub struct ItemsPageTemplate {
    pub toasts: Vec<FlashView>,
    pub q: String,
    /// Current sort parameter value, or "" for backend order.
    pub sort: &'static str,
    pub items: Vec<ItemRowView>,
    pub form: ItemFormView,
}

#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub sort: String,
    pub edit: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub qty_on_hand: String,
}

async fn render_page(
    state: &AppState,
    session: &Session,
    q: String,
    sort: Option<SortKey>,
    edit: Option<i32>,
    form_override: Option<ItemFormView>,
) -> Result<ItemsPageTemplate> {
    let mut toasts: Vec<FlashView> =
        Flash::take(session).await.map(Into::into).into_iter().collect();

    let items = match state.backend().list_items().await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load items: {e}");
            toasts.push(FlashView::load_error("Failed to load items"));
            vec![]
        }
    };

    let form = form_override.unwrap_or_else(|| {
        edit.map(ItemId::new)
            .and_then(|id| items.iter().find(|it| it.id == id))
            .map_or_else(ItemFormView::default, ItemFormView::editing)
    });

    let mut filtered = filter_items(items, &q);
    sort_items(&mut filtered, sort);

    Ok(ItemsPageTemplate {
        toasts,
        q,
        sort: sort.map_or("", SortKey::as_str),
        items: filtered.into_iter().map(Into::into).collect(),
        form,
    })
}

/// Inventory page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ItemsQuery>,
) -> Result<ItemsPageTemplate> {
    let sort = SortKey::parse(&query.sort);
    render_page(&state, &session, query.q, sort, query.edit, None).await
}

fn validate(form: &ItemForm) -> std::result::Result<NewItem, String> {
    let description = form.description.trim();
    if description.is_empty() {
        return Err("Description is required".to_string());
    }

    let unit_price = form
        .unit_price
        .trim()
        .parse::<Decimal>()
        .ok()
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| "Unit Price > 0".to_string())?;

    // u32 parsing rejects negatives and garbage in one go.
    let qty_on_hand = form
        .qty_on_hand
        .trim()
        .parse::<u32>()
        .map_err(|_| "Qty >= 0".to_string())?;

    Ok(NewItem {
        description: description.to_string(),
        unit_price: Money::new(unit_price),
        qty_on_hand,
    })
}

fn failed_form(id: Option<i32>, form: &ItemForm, error: String) -> ItemFormView {
    ItemFormView {
        id,
        description: form.description.clone(),
        unit_price: form.unit_price.clone(),
        qty_on_hand: form.qty_on_hand.clone(),
        error: Some(error),
    }
}

/// Create an item.
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    let new = match validate(&form) {
        Ok(new) => new,
        Err(error) => {
            let page = render_page(
                &state,
                &session,
                String::new(),
                None,
                None,
                Some(failed_form(None, &form, error)),
            )
            .await?;
            return Ok(page.into_response());
        }
    };

    match state.backend().create_item(&new).await {
        Ok(_) => {
            Flash::success("Item saved").set(&session).await?;
            Ok(Redirect::to("/items").into_response())
        }
        Err(e) => {
            tracing::error!("Item create failed: {e}");
            let page = render_page(
                &state,
                &session,
                String::new(),
                None,
                None,
                Some(failed_form(None, &form, "Operation failed.".to_string())),
            )
            .await?;
            Ok(page.into_response())
        }
    }
}

/// Update an item.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    let new = match validate(&form) {
        Ok(new) => new,
        Err(error) => {
            let page = render_page(
                &state,
                &session,
                String::new(),
                None,
                None,
                Some(failed_form(Some(id), &form, error)),
            )
            .await?;
            return Ok(page.into_response());
        }
    };

    match state.backend().update_item(ItemId::new(id), &new).await {
        Ok(_) => {
            Flash::success("Item updated").set(&session).await?;
            Ok(Redirect::to("/items").into_response())
        }
        Err(e) => {
            tracing::error!(item_id = id, "Item update failed: {e}");
            let page = render_page(
                &state,
                &session,
                String::new(),
                None,
                None,
                Some(failed_form(Some(id), &form, "Operation failed.".to_string())),
            )
            .await?;
            Ok(page.into_response())
        }
    }
}

/// Delete an item.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    match state.backend().delete_item(ItemId::new(id)).await {
        Ok(()) => Flash::success("Item deleted").set(&session).await?,
        Err(e) => {
            tracing::error!(item_id = id, "Item delete failed: {e}");
            Flash::error("Delete failed").set(&session).await?;
        }
    }
    Ok(Redirect::to("/items"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn item(id: i32, desc: &str, price: &str, stock: u32) -> Item {
        Item {
            id: ItemId::new(id),
            description: desc.to_string(),
            unit_price: Money::new(Decimal::from_str(price).expect("decimal")),
            qty_on_hand: stock,
        }
    }

    fn sample() -> Vec<Item> {
        vec![
            item(1, "Black Tea 500g", "450.00", 12),
            item(2, "Chocolate Biscuit", "120.50", 3),
            item(3, "Condensed Milk", "280.00", 7),
        ]
    }

    #[test]
    fn test_filter_matches_description_case_insensitive() {
        let hits = filter_items(sample(), "TEA");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ItemId::new(1));
    }

    #[test]
    fn test_sort_price_asc_and_desc() {
        let mut items = sample();
        sort_items(&mut items, Some(SortKey::PriceAsc));
        assert_eq!(items[0].id, ItemId::new(2));
        assert_eq!(items[2].id, ItemId::new(1));

        sort_items(&mut items, Some(SortKey::PriceDesc));
        assert_eq!(items[0].id, ItemId::new(1));
    }

    #[test]
    fn test_sort_qty() {
        let mut items = sample();
        sort_items(&mut items, Some(SortKey::QtyAsc));
        assert_eq!(items[0].qty_on_hand, 3);

        sort_items(&mut items, Some(SortKey::QtyDesc));
        assert_eq!(items[0].qty_on_hand, 12);
    }

    #[test]
    fn test_sort_key_parse_tolerates_garbage() {
        assert_eq!(SortKey::parse("priceAsc"), Some(SortKey::PriceAsc));
        assert_eq!(SortKey::parse("qtyDesc"), Some(SortKey::QtyDesc));
        assert_eq!(SortKey::parse(""), None);
        assert_eq!(SortKey::parse("priceasc"), None);
    }

    #[test]
    fn test_no_sort_keeps_backend_order() {
        let mut items = sample();
        sort_items(&mut items, None);
        assert_eq!(items[0].id, ItemId::new(1));
        assert_eq!(items[2].id, ItemId::new(3));
    }

    #[test]
    fn test_low_stock_flag() {
        let row = ItemRowView::from(item(2, "Chocolate Biscuit", "120.50", 3));
        assert!(row.low_stock);

        let row = ItemRowView::from(item(1, "Black Tea 500g", "450.00", 5));
        assert!(!row.low_stock);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let base = ItemForm {
            description: "Tea".to_string(),
            unit_price: "10.00".to_string(),
            qty_on_hand: "5".to_string(),
        };

        let form = ItemForm {
            description: "  ".to_string(),
            ..base_clone(&base)
        };
        assert_eq!(validate(&form), Err("Description is required".to_string()));

        for bad in ["", "0", "-1", "abc"] {
            let form = ItemForm {
                unit_price: bad.to_string(),
                ..base_clone(&base)
            };
            assert_eq!(validate(&form), Err("Unit Price > 0".to_string()), "{bad}");
        }

        for bad in ["", "-3", "2.5", "x"] {
            let form = ItemForm {
                qty_on_hand: bad.to_string(),
                ..base_clone(&base)
            };
            assert_eq!(validate(&form), Err("Qty >= 0".to_string()), "{bad}");
        }
    }

    #[test]
    fn test_validate_accepts_zero_stock() {
        let form = ItemForm {
            description: "Tea".to_string(),
            unit_price: "10.00".to_string(),
            qty_on_hand: "0".to_string(),
        };
        let new = validate(&form).expect("valid");
        assert_eq!(new.qty_on_hand, 0);
    }

    fn base_clone(form: &ItemForm) -> ItemForm {
        ItemForm {
            description: form.description.clone(),
            unit_price: form.unit_price.clone(),
            qty_on_hand: form.qty_on_hand.clone(),
        }
    }
}
