use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::{
    entities::{
        category::Category,
        gallery_image::GalleryImage,
        option_fields::OptionField,
        project::{Project, ProjectFilter, ProjectInsert, ProjectRow, UpdateProjectRequest},
        technology::Technology,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const TECHNOLOGIES_LINK: (&str, &str) = ("project_technologies", "technology_id");
const GALLERY_LINK: (&str, &str) = ("project_galerie_images", "image_id");

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create_project(&self, insert: &ProjectInsert) -> Result<Project, AppError>;
    async fn get_project_by_slug(&self, slug: &str, published_only: bool) -> Result<Project, AppError>;
    async fn list_projects(&self, filter: &ProjectFilter, published_only: bool) -> Result<(Vec<Project>, i64), AppError>;
    async fn update_project_by_slug(&self, slug: &str, changes: &UpdateProjectRequest) -> Result<Project, AppError>;
    async fn delete_project_by_slug(&self, slug: &str) -> Result<ProjectRow, AppError>;
    async fn project_exists_with_slug(&self, slug: &str) -> Result<bool, AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProjectRepo { pool }
    }

    /// Batch-resolve categories, technologies and gallery images for a page
    /// of project rows, instead of issuing one query per project.
    async fn attach_relations(&self, rows: Vec<ProjectRow>) -> Result<Vec<Project>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        #[derive(sqlx::FromRow)]
        struct TechnologyLinkRow {
            project_id: i32,
            id: i32,
            name: String,
            logo: Option<String>,
        }

        let technology_rows: Vec<TechnologyLinkRow> = sqlx::query_as(
            r#"
            SELECT pt.project_id, t.id, t.name, t.logo
            FROM project_technologies pt
            JOIN technologies t ON t.id = pt.technology_id
            WHERE pt.project_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut technologies: HashMap<i32, Vec<Technology>> = HashMap::new();
        for link in technology_rows {
            technologies.entry(link.project_id).or_default().push(Technology {
                id: link.id,
                name: link.name,
                logo: link.logo,
            });
        }

        #[derive(sqlx::FromRow)]
        struct GalleryLinkRow {
            project_id: i32,
            id: i32,
            image: String,
            description: Option<String>,
        }

        let gallery_rows: Vec<GalleryLinkRow> = sqlx::query_as(
            r#"
            SELECT pg.project_id, g.id, g.image, g.description
            FROM project_galerie_images pg
            JOIN galerie_images g ON g.id = pg.image_id
            WHERE pg.project_id = ANY($1)
            ORDER BY g.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut galleries: HashMap<i32, Vec<GalleryImage>> = HashMap::new();
        for link in gallery_rows {
            galleries.entry(link.project_id).or_default().push(GalleryImage {
                id: link.id,
                image: link.image,
                description: link.description,
            });
        }

        let category_ids: Vec<i32> = rows.iter().filter_map(|r| r.categorie_id).collect();
        let mut categories: HashMap<i32, Category> = HashMap::new();
        if !category_ids.is_empty() {
            let category_rows: Vec<Category> = sqlx::query_as(
                "SELECT * FROM categories WHERE id = ANY($1)"
            )
            .bind(&category_ids)
            .fetch_all(&self.pool)
            .await?;

            for category in category_rows {
                categories.insert(category.id, category);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let categorie = row.categorie_id.and_then(|id| categories.get(&id).cloned());
                let technologies = technologies.remove(&row.id).unwrap_or_default();
                let galerie_images = galleries.remove(&row.id).unwrap_or_default();
                Project {
                    row,
                    categorie,
                    technologies,
                    galerie_images,
                }
            })
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn create_project(&self, insert: &ProjectInsert) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(categorie_id) = insert.categorie_id {
            ensure_category_exists(&mut tx, categorie_id).await?;
        }
        ensure_linked_ids_exist(&mut tx, "technologies", "technologies_ids", &insert.technologies_ids).await?;
        ensure_linked_ids_exist(&mut tx, "galerie_images", "galerie_images_ids", &insert.galerie_images_ids).await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO projects (
                titre, slug, description_courte, description_longue, image_principale,
                categorie_id, lien_github, lien_demo, ordre_affichage, est_publie
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&insert.titre)
        .bind(&insert.slug)
        .bind(&insert.description_courte)
        .bind(&insert.description_longue)
        .bind(&insert.image_principale)
        .bind(insert.categorie_id)
        .bind(&insert.lien_github)
        .bind(&insert.lien_demo)
        .bind(insert.ordre_affichage)
        .bind(insert.est_publie)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("projects_slug_key") {
                    return AppError::Conflict("A project with this slug already exists".into());
                }
            }
            AppError::from(e)
        })?;

        replace_links(&mut tx, id, TECHNOLOGIES_LINK, &insert.technologies_ids).await?;
        replace_links(&mut tx, id, GALLERY_LINK, &insert.galerie_images_ids).await?;

        tx.commit().await?;

        self.get_project_by_slug(&insert.slug, false).await
    }

    async fn get_project_by_slug(&self, slug: &str, published_only: bool) -> Result<Project, AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM projects WHERE slug = ");
        builder.push_bind(slug);
        if published_only {
            builder.push(" AND est_publie = TRUE");
        }

        let row: Option<ProjectRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        let mut projects = self.attach_relations(vec![row]).await?;
        Ok(projects.remove(0))
    }

    async fn list_projects(&self, filter: &ProjectFilter, published_only: bool) -> Result<(Vec<Project>, i64), AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM projects WHERE TRUE");
        push_filters(&mut builder, filter, published_only);

        match &filter.ordering {
            Some(ordering) => {
                builder.push(" ORDER BY ");
                builder.push(ordering.as_sql());
            }
            None => {
                builder.push(" ORDER BY ordre_affichage ASC, date_creation DESC");
            }
        }

        builder.push(" LIMIT ").push_bind(filter.limit);
        builder.push(" OFFSET ").push_bind(filter.offset);

        let rows: Vec<ProjectRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM projects WHERE TRUE");
        push_filters(&mut count_builder, filter, published_only);
        let count: i64 = count_builder.build_query_scalar().fetch_one(&self.pool).await?;

        let projects = self.attach_relations(rows).await?;
        Ok((projects, count))
    }

    async fn update_project_by_slug(&self, slug: &str, changes: &UpdateProjectRequest) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ProjectRow> = sqlx::query_as("SELECT * FROM projects WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut *tx)
            .await?;
        let row = row.ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        if let OptionField::SetToValue(categorie_id) = &changes.categorie_id {
            ensure_category_exists(&mut tx, *categorie_id).await?;
        }
        if let Some(ids) = changes.technologies_ids.flatten_slice() {
            ensure_linked_ids_exist(&mut tx, "technologies", "technologies_ids", ids).await?;
        }
        if let Some(ids) = changes.galerie_images_ids.flatten_slice() {
            ensure_linked_ids_exist(&mut tx, "galerie_images", "galerie_images_ids", ids).await?;
        }

        let mut builder = QueryBuilder::new("UPDATE projects SET date_mise_a_jour = NOW()");

        if let Some(titre) = changes.titre.flatten_str() {
            builder.push(", titre = ").push_bind(titre);
        }
        if let Some(description) = changes.description_courte.flatten_str() {
            builder.push(", description_courte = ").push_bind(description);
        }
        if let Some(description) = changes.description_longue.flatten_str() {
            builder.push(", description_longue = ").push_bind(description);
        }
        if let Some(image) = changes.image_principale.flatten_str() {
            builder.push(", image_principale = ").push_bind(image);
        }
        match &changes.categorie_id {
            OptionField::SetToValue(id) => {
                builder.push(", categorie_id = ").push_bind(*id);
            }
            OptionField::SetToNull => {
                builder.push(", categorie_id = NULL");
            }
            OptionField::Unchanged => {}
        }
        match &changes.lien_github {
            OptionField::SetToValue(url) => {
                builder.push(", lien_github = ").push_bind(url.as_str());
            }
            OptionField::SetToNull => {
                builder.push(", lien_github = NULL");
            }
            OptionField::Unchanged => {}
        }
        match &changes.lien_demo {
            OptionField::SetToValue(url) => {
                builder.push(", lien_demo = ").push_bind(url.as_str());
            }
            OptionField::SetToNull => {
                builder.push(", lien_demo = NULL");
            }
            OptionField::Unchanged => {}
        }
        if let Some(ordre) = changes.ordre_affichage.flatten_i32() {
            builder.push(", ordre_affichage = ").push_bind(ordre);
        }
        if let Some(est_publie) = changes.est_publie.flatten_bool() {
            builder.push(", est_publie = ").push_bind(est_publie);
        }

        builder.push(" WHERE id = ").push_bind(row.id);
        builder.build().execute(&mut *tx).await?;

        match &changes.technologies_ids {
            OptionField::SetToValue(ids) => replace_links(&mut tx, row.id, TECHNOLOGIES_LINK, ids).await?,
            OptionField::SetToNull => replace_links(&mut tx, row.id, TECHNOLOGIES_LINK, &[]).await?,
            OptionField::Unchanged => {}
        }
        match &changes.galerie_images_ids {
            OptionField::SetToValue(ids) => replace_links(&mut tx, row.id, GALLERY_LINK, ids).await?,
            OptionField::SetToNull => replace_links(&mut tx, row.id, GALLERY_LINK, &[]).await?,
            OptionField::Unchanged => {}
        }

        tx.commit().await?;

        self.get_project_by_slug(slug, false).await
    }

    async fn delete_project_by_slug(&self, slug: &str) -> Result<ProjectRow, AppError> {
        // Join rows are removed by ON DELETE CASCADE.
        let row: Option<ProjectRow> = sqlx::query_as(
            "DELETE FROM projects WHERE slug = $1 RETURNING *"
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn project_exists_with_slug(&self, slug: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM projects WHERE slug = $1)"
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter, published_only: bool) {
    if published_only {
        builder.push(" AND est_publie = TRUE");
    }
    if let Some(categorie) = filter.categorie {
        builder.push(" AND categorie_id = ").push_bind(categorie);
    }
    if let Some(technology) = filter.technology {
        builder
            .push(" AND EXISTS (SELECT 1 FROM project_technologies pt WHERE pt.project_id = projects.id AND pt.technology_id = ")
            .push_bind(technology)
            .push(")");
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        builder.push(" AND (titre ILIKE ").push_bind(pattern.clone());
        builder.push(" OR description_courte ILIKE ").push_bind(pattern.clone());
        builder.push(" OR description_longue ILIKE ").push_bind(pattern);
        builder.push(")");
    }
}

async fn ensure_category_exists(conn: &mut PgConnection, categorie_id: i32) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)"
    )
    .bind(categorie_id)
    .fetch_one(&mut *conn)
    .await?;

    if !exists {
        return Err(AppError::field_error(
            "categorie_id",
            format!("Category {} does not exist", categorie_id),
        ));
    }
    Ok(())
}

/// Fail with a field-level error when any of `ids` is missing from `table`.
async fn ensure_linked_ids_exist(
    conn: &mut PgConnection,
    table: &str,
    field: &str,
    ids: &[i32],
) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }

    let mut builder = QueryBuilder::new("SELECT id FROM ");
    builder.push(table);
    builder.push(" WHERE id = ANY(");
    builder.push_bind(ids.to_vec());
    builder.push(")");

    let found: Vec<i32> = builder.build_query_scalar().fetch_all(&mut *conn).await?;
    let missing: Vec<i32> = ids.iter().filter(|id| !found.contains(id)).copied().collect();

    if !missing.is_empty() {
        let ids_list = missing
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::field_error(
            field,
            format!("Objects with ids [{}] do not exist", ids_list),
        ));
    }
    Ok(())
}

async fn replace_links(
    conn: &mut PgConnection,
    project_id: i32,
    link: (&str, &str),
    ids: &[i32],
) -> Result<(), AppError> {
    let (table, column) = link;

    let mut delete = QueryBuilder::new("DELETE FROM ");
    delete.push(table);
    delete.push(" WHERE project_id = ");
    delete.push_bind(project_id);
    delete.build().execute(&mut *conn).await?;

    if !ids.is_empty() {
        let mut insert = QueryBuilder::new(format!("INSERT INTO {} (project_id, {}) ", table, column));
        insert.push_values(ids.iter(), |mut b, id| {
            b.push_bind(project_id).push_bind(*id);
        });
        insert.build().execute(&mut *conn).await?;
    }
    Ok(())
}
