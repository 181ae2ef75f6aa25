use actix_multipart::form::MultipartForm;
use actix_web::{web, Either, HttpRequest, HttpResponse};
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;
use tracing::instrument;

use crate::{
    constants::START_TIME,
    entities::category::{NewCategoryRequest, UpdateCategoryRequest},
    entities::gallery_image::GalleryImageUpload,
    entities::technology::{NewTechnologyRequest, TechnologyUpload, UpdateTechnologyRequest},
    errors::AppError,
    handlers::projects::{build_filter, ProjectListQuery},
    media::{PROJECT_GALLERY_DIR, TECHNOLOGY_LOGO_DIR},
    pagination::{clamp_page, clamp_page_size, page_offset, PageQuery, Paginated},
    policy::{authorize, AccessRule, Action, Principal},
    repositories::user::UserRepository,
    AppState,
};

// ───── Health ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    database: String,
    version: String,
}

#[instrument(skip(state))]
pub async fn health_check(
    state: web::Data<AppState>,
    principal: Principal,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::Retrieve)?;

    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    let database = match state.auth_handler.user_repo.check_connection().await {
        Ok(_) => "OK",
        Err(_) => "Unavailable",
    };

    Ok(HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy".to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now.to_rfc3339(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

// ───── Projects (staff view) ────────────────────────────────────────

/// Listing that includes unpublished rows, for the admin interface.
#[instrument(skip(state, req, query))]
pub async fn list_all_projects(
    state: web::Data<AppState>,
    req: HttpRequest,
    principal: Principal,
    query: web::Query<ProjectListQuery>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::List)?;

    let (filter, page, page_size) = build_filter(&query)?;
    let (results, count) = state.project_handler.list_projects(&filter, false).await?;

    Ok(HttpResponse::Ok().json(Paginated::new(&req, page, page_size, count, results)))
}

// ───── Categories ───────────────────────────────────────────────────

#[instrument(skip(state, request))]
pub async fn create_category(
    state: web::Data<AppState>,
    principal: Principal,
    request: web::Json<NewCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::Create)?;

    let category = state.category_handler.create_category(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(category))
}

#[instrument(skip(state, changes))]
pub async fn update_category(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
    changes: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::PartialUpdate)?;

    let category = state
        .category_handler
        .update_category(*id, changes.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[instrument(skip(state, id))]
pub async fn delete_category(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::Delete)?;

    state.category_handler.delete_category(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ───── Technologies ─────────────────────────────────────────────────

#[instrument(skip(state, payload))]
pub async fn create_technology(
    state: web::Data<AppState>,
    principal: Principal,
    payload: Result<Either<MultipartForm<TechnologyUpload>, web::Json<NewTechnologyRequest>>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::Create)?;

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
            let mut data = form.data.0;

            if let Some(file) = &form.logo {
                let key = state
                    .media
                    .store_image(TECHNOLOGY_LOGO_DIR, "logo", file)
                    .await?;
                data.logo = Some(key);
            }
            data
        }
        Either::Right(json) => json.into_inner(),
    };

    let technology = state.technology_handler.create_technology(request).await?;
    Ok(HttpResponse::Created().json(technology))
}

#[instrument(skip(state, changes))]
pub async fn update_technology(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
    changes: web::Json<UpdateTechnologyRequest>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::PartialUpdate)?;

    let technology = state
        .technology_handler
        .update_technology(*id, changes.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(technology))
}

#[instrument(skip(state, id))]
pub async fn delete_technology(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::Delete)?;

    state.technology_handler.delete_technology(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// ───── Gallery images ───────────────────────────────────────────────

#[instrument(skip(state, req, query))]
pub async fn list_gallery_images(
    state: web::Data<AppState>,
    req: HttpRequest,
    principal: Principal,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::List)?;

    let page = clamp_page(query.page);
    let page_size = clamp_page_size(query.page_size);
    let (results, count) = state
        .gallery_handler
        .list_gallery_images(page_size as i64, page_offset(page, page_size))
        .await?;

    Ok(HttpResponse::Ok().json(Paginated::new(&req, page, page_size, count, results)))
}

#[instrument(skip(state, form))]
pub async fn create_gallery_image(
    state: web::Data<AppState>,
    principal: Principal,
    form: MultipartForm<GalleryImageUpload>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::Create)?;

    let form = form.into_inner();
    let key = state
        .media
        .store_image(PROJECT_GALLERY_DIR, "image", &form.image)
        .await?;
    let description = form.description.map(|d| d.0);

    let image = state.gallery_handler.create_gallery_image(key, description).await?;
    Ok(HttpResponse::Created().json(image))
}

#[instrument(skip(state, id))]
pub async fn delete_gallery_image(
    state: web::Data<AppState>,
    principal: Principal,
    id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    authorize(AccessRule::RequireStaff, &principal, Action::Delete)?;

    state.gallery_handler.delete_gallery_image(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}
