use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::contact::{
        ContactFilter, ContactOrdering, NewContactRequest, TypeProjet, UpdateContactRequest,
    },
    errors::AppError,
    pagination::{clamp_page, clamp_page_size, page_offset, Paginated},
    policy::{authorize, contact_rule, Action, Principal},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub type_projet: Option<TypeProjet>,
    pub traite: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

fn build_filter(query: &ContactListQuery) -> Result<(ContactFilter, u32, u32), AppError> {
    let page = clamp_page(query.page);
    let page_size = clamp_page_size(query.page_size);

    let ordering = query
        .ordering
        .as_deref()
        .map(ContactOrdering::parse)
        .transpose()?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let filter = ContactFilter {
        type_projet: query.type_projet,
        traite: query.traite,
        search,
        ordering,
        limit: page_size as i64,
        offset: page_offset(page, page_size),
    };

    Ok((filter, page, page_size))
}

/// Public contact form submission.
#[instrument(skip(state, form))]
pub async fn create_contact(
    state: web::Data<AppState>,
    principal: Principal,
    form: web::Json<NewContactRequest>,
) -> Result<HttpResponse, AppError> {
    authorize(contact_rule(Action::Create), &principal, Action::Create)?;

    let contact = state.contact_handler.create_contact(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(contact))
}

#[instrument(skip(state, req, query))]
pub async fn list_contacts(
    state: web::Data<AppState>,
    req: HttpRequest,
    principal: Principal,
    query: web::Query<ContactListQuery>,
) -> Result<HttpResponse, AppError> {
    authorize(contact_rule(Action::List), &principal, Action::List)?;

    let (filter, page, page_size) = build_filter(&query)?;
    let (results, count) = state.contact_handler.list_contacts(&filter).await?;

    Ok(HttpResponse::Ok().json(Paginated::new(&req, page, page_size, count, results)))
}

#[instrument(skip(state, id))]
pub async fn get_contact(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(contact_rule(Action::Retrieve), &principal, Action::Retrieve)?;

    let contact = state.contact_handler.get_contact(*id).await?;
    Ok(HttpResponse::Ok().json(contact))
}

pub async fn update_contact(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
    changes: web::Json<UpdateContactRequest>,
) -> Result<HttpResponse, AppError> {
    apply_update(state, principal, id, changes, Action::Update).await
}

pub async fn partially_update_contact(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
    changes: web::Json<UpdateContactRequest>,
) -> Result<HttpResponse, AppError> {
    apply_update(state, principal, id, changes, Action::PartialUpdate).await
}

#[instrument(skip(state, changes))]
async fn apply_update(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
    changes: web::Json<UpdateContactRequest>,
    action: Action,
) -> Result<HttpResponse, AppError> {
    authorize(contact_rule(action), &principal, action)?;

    let contact = state
        .contact_handler
        .update_contact(*id, changes.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(contact))
}

#[instrument(skip(state, id))]
pub async fn delete_contact(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(contact_rule(Action::Delete), &principal, Action::Delete)?;

    state.contact_handler.delete_contact(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}
