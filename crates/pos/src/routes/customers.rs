//! Customers page: list with search plus an upsert form.
//!
//! The form doubles for create and edit; `?edit={id}` prefills it from the
//! listed customer. Mutations follow POST-redirect-GET with a one-shot flash,
//! except validation and backend failures, which re-render the page with the
//! submitted values intact.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tillhouse_core::{Customer, CustomerId, NewCustomer};

use crate::error::Result;
use crate::filters;
use crate::models::Flash;
use crate::routes::FlashView;
use crate::state::AppState;

/// Customers page template.
#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct CustomersPageTemplate {
    pub toasts: Vec<FlashView>,
    /// Current search filter, echoed back into the search input.
    pub q: String,
    pub customers: Vec<Customer>,
    pub form: CustomerFormView,
}

/// Upsert form display data. `id` is set when editing.
#[derive(Debug, Clone, Default)]
pub struct CustomerFormView {
    pub id: Option<i32>,
    pub name: String,
    pub address: String,
    pub error: Option<String>,
}

impl CustomerFormView {
    fn editing(customer: &Customer) -> Self {
        Self {
            id: Some(customer.id.as_i32()),
            name: customer.name.clone(),
            address: customer.address.clone(),
            error: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CustomersQuery {
    #[serde(default)]
    pub q: String,
    pub edit: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// Case-insensitive substring filter on name or address.
fn filter_customers(customers: Vec<Customer>, q: &str) -> Vec<Customer> {
    let needle = q.trim().to_lowercase();
    if needle.is_empty() {
        return customers;
    }
    customers
        .into_iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.address.to_lowercase().contains(&needle)
        })
        .collect()
}

async fn render_page(
    state: &AppState,
    session: &Session,
    q: String,
    edit: Option<i32>,
    form_override: Option<CustomerFormView>,
) -> Result<CustomersPageTemplate> {
    let mut toasts: Vec<FlashView> =
        Flash::take(session).await.map(Into::into).into_iter().collect();

    let customers = match state.backend().list_customers().await {
        Ok(customers) => customers,
        Err(e) => {
            tracing::error!("Failed to load customers: {e}");
            toasts.push(FlashView::load_error("Failed to load customers"));
            vec![]
        }
    };

    let form = form_override.unwrap_or_else(|| {
        edit.map(CustomerId::new)
            .and_then(|id| customers.iter().find(|c| c.id == id))
            .map_or_else(CustomerFormView::default, CustomerFormView::editing)
    });

    Ok(CustomersPageTemplate {
        toasts,
        customers: filter_customers(customers, &q),
        q,
        form,
    })
}

/// Customers list page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CustomersQuery>,
) -> Result<CustomersPageTemplate> {
    render_page(&state, &session, query.q, query.edit, None).await
}

fn validate(form: &CustomerForm) -> std::result::Result<NewCustomer, String> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    let address = form.address.trim();
    if address.is_empty() {
        return Err("Address is required".to_string());
    }
    Ok(NewCustomer {
        name: name.to_string(),
        address: address.to_string(),
    })
}

fn failed_form(id: Option<i32>, form: &CustomerForm, error: String) -> CustomerFormView {
    CustomerFormView {
        id,
        name: form.name.clone(),
        address: form.address.clone(),
        error: Some(error),
    }
}

/// Create a customer.
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let new = match validate(&form) {
        Ok(new) => new,
        Err(error) => {
            let page =
                render_page(&state, &session, String::new(), None, Some(failed_form(None, &form, error)))
                    .await?;
            return Ok(page.into_response());
        }
    };

    match state.backend().create_customer(&new).await {
        Ok(_) => {
            Flash::success("Customer saved").set(&session).await?;
            Ok(Redirect::to("/customers").into_response())
        }
        Err(e) => {
            tracing::error!("Customer create failed: {e}");
            let page = render_page(
                &state,
                &session,
                String::new(),
                None,
                Some(failed_form(None, &form, "Operation failed.".to_string())),
            )
            .await?;
            Ok(page.into_response())
        }
    }
}

/// Update a customer.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let new = match validate(&form) {
        Ok(new) => new,
        Err(error) => {
            let page = render_page(
                &state,
                &session,
                String::new(),
                None,
                Some(failed_form(Some(id), &form, error)),
            )
            .await?;
            return Ok(page.into_response());
        }
    };

    match state.backend().update_customer(CustomerId::new(id), &new).await {
        Ok(_) => {
            Flash::success("Customer updated").set(&session).await?;
            Ok(Redirect::to("/customers").into_response())
        }
        Err(e) => {
            tracing::error!(customer_id = id, "Customer update failed: {e}");
            let page = render_page(
                &state,
                &session,
                String::new(),
                None,
                Some(failed_form(Some(id), &form, "Operation failed.".to_string())),
            )
            .await?;
            Ok(page.into_response())
        }
    }
}

/// Delete a customer.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    match state.backend().delete_customer(CustomerId::new(id)).await {
        Ok(()) => Flash::success("Customer deleted").set(&session).await?,
        Err(e) => {
            tracing::error!(customer_id = id, "Customer delete failed: {e}");
            Flash::error("Delete failed").set(&session).await?;
        }
    }
    Ok(Redirect::to("/customers"))
}
