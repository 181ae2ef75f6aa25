use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::{
    entities::category::Category,
    entities::option_fields::OptionField,
    errors::AppError,
    repositories::sqlx_repo::SqlxCategoryRepo,
};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<(Vec<Category>, i64), AppError>;
    async fn get_category_by_id(&self, id: i32) -> Result<Category, AppError>;
    async fn create_category(&self, name: &str, slug: &str) -> Result<Category, AppError>;
    async fn update_category(&self, id: i32, name: &OptionField<String>) -> Result<Category, AppError>;
    async fn delete_category(&self, id: i32) -> Result<(), AppError>;
    async fn category_exists_with_slug(&self, slug: &str) -> Result<bool, AppError>;
}

impl SqlxCategoryRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxCategoryRepo { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepo {
    async fn list_categories(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<(Vec<Category>, i64), AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM categories WHERE TRUE");
        if let Some(search) = search {
            builder.push(" AND name ILIKE ").push_bind(format!("%{}%", search));
        }
        builder.push(" ORDER BY name");
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let categories: Vec<Category> = builder.build_query_as().fetch_all(&self.pool).await?;

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM categories WHERE TRUE");
        if let Some(search) = search {
            count_builder.push(" AND name ILIKE ").push_bind(format!("%{}%", search));
        }
        let count: i64 = count_builder.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((categories, count))
    }

    async fn get_category_by_id(&self, id: i32) -> Result<Category, AppError> {
        let category: Option<Category> = sqlx::query_as("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        category.ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    async fn create_category(&self, name: &str, slug: &str) -> Result<Category, AppError> {
        let category: Category = sqlx::query_as(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING *"
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("categories_slug_key") {
                    return AppError::Conflict("A category with this slug already exists".into());
                }
            }
            AppError::from(e)
        })?;

        Ok(category)
    }

    async fn update_category(&self, id: i32, name: &OptionField<String>) -> Result<Category, AppError> {
        let Some(name) = name.flatten_str() else {
            return self.get_category_by_id(id).await;
        };

        let category: Option<Category> = sqlx::query_as(
            "UPDATE categories SET name = $1 WHERE id = $2 RETURNING *"
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        category.ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    async fn delete_category(&self, id: i32) -> Result<(), AppError> {
        // Referencing projects are detached by the ON DELETE SET NULL
        // constraint, never deleted.
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".into()));
        }
        Ok(())
    }

    async fn category_exists_with_slug(&self, slug: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE slug = $1)"
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
