mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, policy, use_cases};
pub use interfaces::{handlers, middlewares, pagination, repositories, routes};
pub use infrastructure::{auth, db, media};

use auth::jwt::JwtService;
use infrastructure::media::MediaStore;
use repositories::sqlx_repo::{
    SqlxCategoryRepo, SqlxContactRepo, SqlxGalleryImageRepo, SqlxProjectRepo, SqlxTechnologyRepo,
    SqlxUserRepo,
};
use use_cases::auth::AuthHandler;
use use_cases::catalog::{CategoryHandler, GalleryImageHandler, TechnologyHandler};
use use_cases::contacts::ContactHandler;
use use_cases::projects::ProjectHandler;

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub project_handler: ProjectHandler<SqlxProjectRepo>,
    pub category_handler: CategoryHandler<SqlxCategoryRepo>,
    pub technology_handler: TechnologyHandler<SqlxTechnologyRepo>,
    pub gallery_handler: GalleryImageHandler<SqlxGalleryImageRepo>,
    pub contact_handler: ContactHandler<SqlxContactRepo>,
    pub media: MediaStore,
}

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, JwtService>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let media = MediaStore::new(config);

        AppState {
            auth_handler: AuthHandler::new(
                SqlxUserRepo::new(pool.clone()),
                JwtService::new(config),
            ),
            project_handler: ProjectHandler::new(
                SqlxProjectRepo::new(pool.clone()),
                media.clone(),
            ),
            category_handler: CategoryHandler::new(SqlxCategoryRepo::new(pool.clone())),
            technology_handler: TechnologyHandler::new(
                SqlxTechnologyRepo::new(pool.clone()),
                media.clone(),
            ),
            gallery_handler: GalleryImageHandler::new(
                SqlxGalleryImageRepo::new(pool.clone()),
                media.clone(),
            ),
            contact_handler: ContactHandler::new(SqlxContactRepo::new(pool)),
            media,
        }
    }
}
