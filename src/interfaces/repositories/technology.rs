use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::{
    entities::option_fields::OptionField,
    entities::technology::{Technology, UpdateTechnologyRequest},
    errors::AppError,
    repositories::sqlx_repo::SqlxTechnologyRepo,
};

#[async_trait]
pub trait TechnologyRepository: Send + Sync {
    async fn list_technologies(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<(Vec<Technology>, i64), AppError>;
    async fn get_technology_by_id(&self, id: i32) -> Result<Technology, AppError>;
    async fn create_technology(&self, name: &str, logo: Option<&str>) -> Result<Technology, AppError>;
    async fn update_technology(&self, id: i32, changes: &UpdateTechnologyRequest) -> Result<Technology, AppError>;
    async fn delete_technology(&self, id: i32) -> Result<Technology, AppError>;
}

impl SqlxTechnologyRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxTechnologyRepo { pool }
    }
}

#[async_trait]
impl TechnologyRepository for SqlxTechnologyRepo {
    async fn list_technologies(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<(Vec<Technology>, i64), AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM technologies WHERE TRUE");
        if let Some(search) = search {
            builder.push(" AND name ILIKE ").push_bind(format!("%{}%", search));
        }
        builder.push(" ORDER BY name");
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let technologies: Vec<Technology> = builder.build_query_as().fetch_all(&self.pool).await?;

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM technologies WHERE TRUE");
        if let Some(search) = search {
            count_builder.push(" AND name ILIKE ").push_bind(format!("%{}%", search));
        }
        let count: i64 = count_builder.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((technologies, count))
    }

    async fn get_technology_by_id(&self, id: i32) -> Result<Technology, AppError> {
        let technology: Option<Technology> = sqlx::query_as("SELECT * FROM technologies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        technology.ok_or_else(|| AppError::NotFound("Technology not found".into()))
    }

    async fn create_technology(&self, name: &str, logo: Option<&str>) -> Result<Technology, AppError> {
        let technology: Technology = sqlx::query_as(
            "INSERT INTO technologies (name, logo) VALUES ($1, $2) RETURNING *"
        )
        .bind(name)
        .bind(logo)
        .fetch_one(&self.pool)
        .await?;

        Ok(technology)
    }

    async fn update_technology(&self, id: i32, changes: &UpdateTechnologyRequest) -> Result<Technology, AppError> {
        let mut builder = QueryBuilder::new("UPDATE technologies SET id = id");

        if let Some(name) = changes.name.flatten_str() {
            builder.push(", name = ").push_bind(name);
        }
        match &changes.logo {
            OptionField::SetToValue(logo) => {
                builder.push(", logo = ").push_bind(logo.as_str());
            }
            OptionField::SetToNull => {
                builder.push(", logo = NULL");
            }
            OptionField::Unchanged => {}
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING *");

        let technology: Option<Technology> = builder.build_query_as().fetch_optional(&self.pool).await?;
        technology.ok_or_else(|| AppError::NotFound("Technology not found".into()))
    }

    async fn delete_technology(&self, id: i32) -> Result<Technology, AppError> {
        let technology: Option<Technology> = sqlx::query_as(
            "DELETE FROM technologies WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        technology.ok_or_else(|| AppError::NotFound("Technology not found".into()))
    }
}
