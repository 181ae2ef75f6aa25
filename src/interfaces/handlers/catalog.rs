use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    errors::AppError,
    pagination::{clamp_page, clamp_page_size, page_offset, Paginated},
    policy::{authorize, AccessRule, Action, Principal},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct CatalogListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

fn list_params(query: &CatalogListQuery) -> (Option<&str>, u32, u32) {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    (search, clamp_page(query.page), clamp_page_size(query.page_size))
}

#[instrument(skip(state, req, query))]
pub async fn list_categories(
    state: web::Data<AppState>,
    req: HttpRequest,
    principal: Principal,
    query: web::Query<CatalogListQuery>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AllowAny, &principal, Action::List)?;

    let (search, page, page_size) = list_params(&query);
    let (results, count) = state
        .category_handler
        .list_categories(search, page_size as i64, page_offset(page, page_size))
        .await?;

    Ok(HttpResponse::Ok().json(Paginated::new(&req, page, page_size, count, results)))
}

#[instrument(skip(state, id))]
pub async fn get_category(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AllowAny, &principal, Action::Retrieve)?;

    let category = state.category_handler.get_category(*id).await?;
    Ok(HttpResponse::Ok().json(category))
}

#[instrument(skip(state, req, query))]
pub async fn list_technologies(
    state: web::Data<AppState>,
    req: HttpRequest,
    principal: Principal,
    query: web::Query<CatalogListQuery>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AllowAny, &principal, Action::List)?;

    let (search, page, page_size) = list_params(&query);
    let (results, count) = state
        .technology_handler
        .list_technologies(search, page_size as i64, page_offset(page, page_size))
        .await?;

    Ok(HttpResponse::Ok().json(Paginated::new(&req, page, page_size, count, results)))
}

#[instrument(skip(state, id))]
pub async fn get_technology(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AllowAny, &principal, Action::Retrieve)?;

    let technology = state.technology_handler.get_technology(*id).await?;
    Ok(HttpResponse::Ok().json(technology))
}
