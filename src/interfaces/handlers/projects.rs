use actix_multipart::form::MultipartForm;
use actix_web::{web, Either, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::option_fields::OptionField,
    entities::project::{
        NewProjectRequest, ProjectFilter, ProjectOrdering, ProjectUpdateUpload, ProjectUpload,
        UpdateProjectRequest,
    },
    errors::AppError,
    media::PROJECT_MAIN_DIR,
    pagination::{clamp_page, clamp_page_size, page_offset, Paginated},
    policy::{authorize, AccessRule, Action, Principal},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub categorie: Option<i32>,
    pub technologies: Option<i32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Turn the raw query into a repository filter, rejecting anything the
/// ordering whitelist does not cover.
pub fn build_filter(query: &ProjectListQuery) -> Result<(ProjectFilter, u32, u32), AppError> {
    let page = clamp_page(query.page);
    let page_size = clamp_page_size(query.page_size);

    let ordering = query
        .ordering
        .as_deref()
        .map(ProjectOrdering::parse)
        .transpose()?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    let filter = ProjectFilter {
        categorie: query.categorie,
        technology: query.technologies,
        search,
        ordering,
        limit: page_size as i64,
        offset: page_offset(page, page_size),
    };

    Ok((filter, page, page_size))
}

#[instrument(skip(state, req, query))]
pub async fn list_projects(
    state: web::Data<AppState>,
    req: HttpRequest,
    principal: Principal,
    query: web::Query<ProjectListQuery>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AdminOrReadOnly, &principal, Action::List)?;

    let (filter, page, page_size) = build_filter(&query)?;
    let (results, count) = state.project_handler.list_projects(&filter, true).await?;

    Ok(HttpResponse::Ok().json(Paginated::new(&req, page, page_size, count, results)))
}

#[instrument(skip(state, slug))]
pub async fn get_project(
    state: web::Data<AppState>,
    principal: Principal,
    slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AdminOrReadOnly, &principal, Action::Retrieve)?;

    let project = state.project_handler.get_published_project(&slug).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(state, payload))]
pub async fn create_project(
    state: web::Data<AppState>,
    principal: Principal,
    payload: Result<Either<MultipartForm<ProjectUpload>, web::Json<NewProjectRequest>>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AdminOrReadOnly, &principal, Action::Create)?;

    let either = match payload {
        Ok(either) => either,
        Err(e) => {
            return Ok(HttpResponse::UnsupportedMediaType().json(serde_json::json!({
                "error": "Content type error",
                "message": "Request must be either application/json or multipart/form-data",
                "details": e.to_string()
            })));
        }
    };

    let request = match either {
        Either::Left(multipart) => {
            let form = multipart.into_inner();
            let key = state
                .media
                .store_image(PROJECT_MAIN_DIR, "image_principale", &form.image_principale)
                .await?;

            let mut data = form.data.0;
            data.image_principale = Some(key);
            data
        }
        Either::Right(json) => json.into_inner(),
    };

    let response = state.project_handler.create_project(request).await?;
    Ok(HttpResponse::Created().json(response))
}

pub async fn update_project(
    state: web::Data<AppState>,
    principal: Principal,
    slug: web::Path<String>,
    payload: Result<Either<MultipartForm<ProjectUpdateUpload>, web::Json<UpdateProjectRequest>>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    apply_update(state, principal, slug, payload, Action::Update).await
}

pub async fn partially_update_project(
    state: web::Data<AppState>,
    principal: Principal,
    slug: web::Path<String>,
    payload: Result<Either<MultipartForm<ProjectUpdateUpload>, web::Json<UpdateProjectRequest>>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    apply_update(state, principal, slug, payload, Action::PartialUpdate).await
}

#[instrument(skip(state, payload))]
async fn apply_update(
    state: web::Data<AppState>,
    principal: Principal,
    slug: web::Path<String>,
    payload: Result<Either<MultipartForm<ProjectUpdateUpload>, web::Json<UpdateProjectRequest>>, actix_web::Error>,
    action: Action,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AdminOrReadOnly, &principal, action)?;

    let either = match payload {
        Ok(either) => either,
        Err(e) => {
            return Ok(HttpResponse::UnsupportedMediaType().json(serde_json::json!({
                "error": "Content type error",
                "message": "Request must be either application/json or multipart/form-data",
                "details": e.to_string()
            })));
        }
    };

    let changes = match either {
        Either::Left(multipart) => {
            let form = multipart.into_inner();
            let mut changes = form.data.0;

            if let Some(file) = &form.image_principale {
                let key = state
                    .media
                    .store_image(PROJECT_MAIN_DIR, "image_principale", file)
                    .await?;
                changes.image_principale = OptionField::SetToValue(key);
            }
            changes
        }
        Either::Right(json) => json.into_inner(),
    };

    let response = state.project_handler.update_project(&slug, changes).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state, slug))]
pub async fn delete_project(
    state: web::Data<AppState>,
    principal: Principal,
    slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::AdminOrReadOnly, &principal, Action::Delete)?;

    state.project_handler.delete_project(&slug).await?;
    Ok(HttpResponse::NoContent().finish())
}
