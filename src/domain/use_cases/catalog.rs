use validator::Validate;

use crate::{
    entities::category::{Category, NewCategoryRequest, UpdateCategoryRequest},
    entities::gallery_image::GalleryImageResponse,
    entities::technology::{NewTechnologyRequest, TechnologyResponse, UpdateTechnologyRequest},
    errors::AppError,
    media::MediaStore,
    repositories::category::CategoryRepository,
    repositories::gallery_image::GalleryImageRepository,
    repositories::technology::TechnologyRepository,
};

// ───── Categories ───────────────────────────────────────────────────

pub struct CategoryHandler<R>
where
    R: CategoryRepository,
{
    pub category_repo: R,
}

impl<R> CategoryHandler<R>
where
    R: CategoryRepository,
{
    pub fn new(category_repo: R) -> Self {
        CategoryHandler { category_repo }
    }

    pub async fn list_categories(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Category>, i64), AppError> {
        self.category_repo.list_categories(search, limit, offset).await
    }

    pub async fn get_category(&self, id: i32) -> Result<Category, AppError> {
        self.category_repo.get_category_by_id(id).await
    }

    pub async fn create_category(&self, request: NewCategoryRequest) -> Result<Category, AppError> {
        request.validate().map_err(AppError::from)?;

        let slug = match request.slug {
            Some(slug) => slug,
            None => {
                let generated = slug::slugify(&request.name);
                if generated.is_empty() {
                    return Err(AppError::field_error(
                        "slug",
                        "Could not generate a slug from the name; please provide one",
                    ));
                }
                generated
            }
        };

        if self.category_repo.category_exists_with_slug(&slug).await? {
            return Err(AppError::field_error(
                "slug",
                "A category with this slug already exists",
            ));
        }

        self.category_repo.create_category(&request.name, &slug).await
    }

    pub async fn update_category(
        &self,
        id: i32,
        changes: UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        changes.validate().map_err(AppError::from)?;
        if changes.name.is_set_to_null() {
            return Err(AppError::field_error("name", "Field cannot be null"));
        }
        self.category_repo.update_category(id, &changes.name).await
    }

    /// Deleting a category detaches its projects (enforced by the
    /// foreign-key constraint); nothing else is removed.
    pub async fn delete_category(&self, id: i32) -> Result<(), AppError> {
        self.category_repo.delete_category(id).await
    }
}

// ───── Technologies ─────────────────────────────────────────────────

pub struct TechnologyHandler<R>
where
    R: TechnologyRepository,
{
    pub technology_repo: R,
    media: MediaStore,
}

impl<R> TechnologyHandler<R>
where
    R: TechnologyRepository,
{
    pub fn new(technology_repo: R, media: MediaStore) -> Self {
        TechnologyHandler { technology_repo, media }
    }

    pub async fn list_technologies(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<TechnologyResponse>, i64), AppError> {
        let (technologies, count) = self
            .technology_repo
            .list_technologies(search, limit, offset)
            .await?;
        let responses = technologies
            .iter()
            .map(|t| t.to_response(&self.media))
            .collect();
        Ok((responses, count))
    }

    pub async fn get_technology(&self, id: i32) -> Result<TechnologyResponse, AppError> {
        let technology = self.technology_repo.get_technology_by_id(id).await?;
        Ok(technology.to_response(&self.media))
    }

    pub async fn create_technology(
        &self,
        request: NewTechnologyRequest,
    ) -> Result<TechnologyResponse, AppError> {
        request.validate().map_err(AppError::from)?;
        let technology = self
            .technology_repo
            .create_technology(&request.name, request.logo.as_deref())
            .await?;
        Ok(technology.to_response(&self.media))
    }

    pub async fn update_technology(
        &self,
        id: i32,
        changes: UpdateTechnologyRequest,
    ) -> Result<TechnologyResponse, AppError> {
        changes.validate().map_err(AppError::from)?;
        if changes.name.is_set_to_null() {
            return Err(AppError::field_error("name", "Field cannot be null"));
        }
        let technology = self.technology_repo.update_technology(id, &changes).await?;
        Ok(technology.to_response(&self.media))
    }

    pub async fn delete_technology(&self, id: i32) -> Result<(), AppError> {
        let technology = self.technology_repo.delete_technology(id).await?;
        if let Some(logo) = &technology.logo {
            self.media.remove(logo).await;
        }
        Ok(())
    }
}

// ───── Gallery images ───────────────────────────────────────────────

pub struct GalleryImageHandler<R>
where
    R: GalleryImageRepository,
{
    pub gallery_repo: R,
    media: MediaStore,
}

impl<R> GalleryImageHandler<R>
where
    R: GalleryImageRepository,
{
    pub fn new(gallery_repo: R, media: MediaStore) -> Self {
        GalleryImageHandler { gallery_repo, media }
    }

    pub async fn list_gallery_images(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<GalleryImageResponse>, i64), AppError> {
        let (images, count) = self.gallery_repo.list_gallery_images(limit, offset).await?;
        let responses = images.iter().map(|i| i.to_response(&self.media)).collect();
        Ok((responses, count))
    }

    pub async fn create_gallery_image(
        &self,
        image_key: String,
        description: Option<String>,
    ) -> Result<GalleryImageResponse, AppError> {
        let image = self
            .gallery_repo
            .create_gallery_image(&image_key, description.as_deref())
            .await?;
        Ok(image.to_response(&self.media))
    }

    pub async fn delete_gallery_image(&self, id: i32) -> Result<(), AppError> {
        let image = self.gallery_repo.delete_gallery_image(id).await?;
        self.media.remove(&image.image).await;
        Ok(())
    }
}
