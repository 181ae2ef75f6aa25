use validator::Validate;

use crate::{
    entities::project::{
        NewProjectRequest, ProjectFilter, ProjectInsert, ProjectResponse, UpdateProjectRequest,
    },
    errors::AppError,
    media::MediaStore,
    repositories::project::ProjectRepository,
};

pub struct ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub project_repo: R,
    media: MediaStore,
}

impl<R> ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub fn new(project_repo: R, media: MediaStore) -> Self {
        ProjectHandler { project_repo, media }
    }

    /// Creates a project together with its relation links, atomically.
    pub async fn create_project(&self, request: NewProjectRequest) -> Result<ProjectResponse, AppError> {
        let insert = ProjectInsert::try_from(request)?;

        if self.project_repo.project_exists_with_slug(&insert.slug).await? {
            return Err(AppError::field_error(
                "slug",
                "A project with this slug already exists",
            ));
        }

        let project = self.project_repo.create_project(&insert).await?;
        Ok(project.to_response(&self.media))
    }

    /// Public lookup: unpublished projects are indistinguishable from
    /// missing ones.
    pub async fn get_published_project(&self, slug: &str) -> Result<ProjectResponse, AppError> {
        let project = self.project_repo.get_project_by_slug(slug, true).await?;
        Ok(project.to_response(&self.media))
    }

    pub async fn list_projects(
        &self,
        filter: &ProjectFilter,
        published_only: bool,
    ) -> Result<(Vec<ProjectResponse>, i64), AppError> {
        let (projects, count) = self.project_repo.list_projects(filter, published_only).await?;
        let responses = projects
            .iter()
            .map(|p| p.to_response(&self.media))
            .collect();
        Ok((responses, count))
    }

    /// Staff update; reaches unpublished rows so they stay manageable.
    pub async fn update_project(
        &self,
        slug: &str,
        changes: UpdateProjectRequest,
    ) -> Result<ProjectResponse, AppError> {
        changes.validate().map_err(AppError::from)?;

        if changes.image_principale.is_set_to_null() {
            return Err(AppError::field_error(
                "image_principale",
                "A main image is required",
            ));
        }
        for (field, null_requested) in [
            ("titre", changes.titre.is_set_to_null()),
            ("description_courte", changes.description_courte.is_set_to_null()),
            ("description_longue", changes.description_longue.is_set_to_null()),
        ] {
            if null_requested {
                return Err(AppError::field_error(field, "Field cannot be null"));
            }
        }

        let project = self.project_repo.update_project_by_slug(slug, &changes).await?;
        Ok(project.to_response(&self.media))
    }

    pub async fn delete_project(&self, slug: &str) -> Result<(), AppError> {
        let row = self.project_repo.delete_project_by_slug(slug).await?;
        self.media.remove(&row.image_principale).await;
        Ok(())
    }
}
