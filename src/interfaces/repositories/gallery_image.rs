use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::{
    entities::gallery_image::GalleryImage,
    errors::AppError,
    repositories::sqlx_repo::SqlxGalleryImageRepo,
};

#[async_trait]
pub trait GalleryImageRepository: Send + Sync {
    async fn list_gallery_images(&self, limit: i64, offset: i64) -> Result<(Vec<GalleryImage>, i64), AppError>;
    async fn get_gallery_image_by_id(&self, id: i32) -> Result<GalleryImage, AppError>;
    async fn create_gallery_image(&self, image: &str, description: Option<&str>) -> Result<GalleryImage, AppError>;
    async fn delete_gallery_image(&self, id: i32) -> Result<GalleryImage, AppError>;
}

impl SqlxGalleryImageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxGalleryImageRepo { pool }
    }
}

#[async_trait]
impl GalleryImageRepository for SqlxGalleryImageRepo {
    async fn list_gallery_images(&self, limit: i64, offset: i64) -> Result<(Vec<GalleryImage>, i64), AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM galerie_images ORDER BY id DESC");
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let images: Vec<GalleryImage> = builder.build_query_as().fetch_all(&self.pool).await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM galerie_images")
            .fetch_one(&self.pool)
            .await?;

        Ok((images, count))
    }

    async fn get_gallery_image_by_id(&self, id: i32) -> Result<GalleryImage, AppError> {
        let image: Option<GalleryImage> = sqlx::query_as("SELECT * FROM galerie_images WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        image.ok_or_else(|| AppError::NotFound("Gallery image not found".into()))
    }

    async fn create_gallery_image(&self, image: &str, description: Option<&str>) -> Result<GalleryImage, AppError> {
        let image: GalleryImage = sqlx::query_as(
            "INSERT INTO galerie_images (image, description) VALUES ($1, $2) RETURNING *"
        )
        .bind(image)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(image)
    }

    async fn delete_gallery_image(&self, id: i32) -> Result<GalleryImage, AppError> {
        let image: Option<GalleryImage> = sqlx::query_as(
            "DELETE FROM galerie_images WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        image.ok_or_else(|| AppError::NotFound("Gallery image not found".into()))
    }
}
