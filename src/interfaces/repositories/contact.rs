use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    entities::contact::{Contact, ContactFilter, NewContactRequest, UpdateContactRequest},
    entities::option_fields::OptionField,
    errors::AppError,
    repositories::sqlx_repo::SqlxContactRepo,
};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create_contact(&self, form: &NewContactRequest) -> Result<Contact, AppError>;
    async fn get_contact_by_id(&self, id: i32) -> Result<Contact, AppError>;
    async fn list_contacts(&self, filter: &ContactFilter) -> Result<(Vec<Contact>, i64), AppError>;
    async fn update_contact(&self, id: i32, changes: &UpdateContactRequest) -> Result<Contact, AppError>;
    async fn delete_contact(&self, id: i32) -> Result<(), AppError>;
}

impl SqlxContactRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxContactRepo { pool }
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepo {
    async fn create_contact(&self, form: &NewContactRequest) -> Result<Contact, AppError> {
        // date_envoi and traite take their column defaults; date_envoi is
        // write-once and never appears in an UPDATE.
        let contact: Contact = sqlx::query_as(
            r#"
            INSERT INTO contacts (nom, email, type_projet, budget, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&form.nom)
        .bind(&form.email)
        .bind(form.type_projet)
        .bind(&form.budget)
        .bind(&form.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn get_contact_by_id(&self, id: i32) -> Result<Contact, AppError> {
        let contact: Option<Contact> = sqlx::query_as("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        contact.ok_or_else(|| AppError::NotFound("Contact message not found".into()))
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<(Vec<Contact>, i64), AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM contacts WHERE TRUE");
        push_filters(&mut builder, filter);

        match &filter.ordering {
            Some(ordering) => {
                builder.push(" ORDER BY ");
                builder.push(ordering.as_sql());
            }
            None => {
                builder.push(" ORDER BY date_envoi DESC");
            }
        }

        builder.push(" LIMIT ").push_bind(filter.limit);
        builder.push(" OFFSET ").push_bind(filter.offset);

        let contacts: Vec<Contact> = builder.build_query_as().fetch_all(&self.pool).await?;

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM contacts WHERE TRUE");
        push_filters(&mut count_builder, filter);
        let count: i64 = count_builder.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((contacts, count))
    }

    async fn update_contact(&self, id: i32, changes: &UpdateContactRequest) -> Result<Contact, AppError> {
        let mut builder = QueryBuilder::new("UPDATE contacts SET id = id");

        if let Some(nom) = changes.nom.flatten_str() {
            builder.push(", nom = ").push_bind(nom);
        }
        if let Some(email) = changes.email.flatten_str() {
            builder.push(", email = ").push_bind(email);
        }
        if let Some(type_projet) = changes.type_projet.flatten_ref() {
            builder.push(", type_projet = ").push_bind(*type_projet);
        }
        match &changes.budget {
            OptionField::SetToValue(budget) => {
                builder.push(", budget = ").push_bind(budget.as_str());
            }
            OptionField::SetToNull => {
                builder.push(", budget = NULL");
            }
            OptionField::Unchanged => {}
        }
        if let Some(message) = changes.message.flatten_str() {
            builder.push(", message = ").push_bind(message);
        }
        if let Some(traite) = changes.traite.flatten_bool() {
            builder.push(", traite = ").push_bind(traite);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING *");

        let contact: Option<Contact> = builder.build_query_as().fetch_optional(&self.pool).await?;
        contact.ok_or_else(|| AppError::NotFound("Contact message not found".into()))
    }

    async fn delete_contact(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Contact message not found".into()));
        }
        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
    if let Some(type_projet) = filter.type_projet {
        builder.push(" AND type_projet = ").push_bind(type_projet);
    }
    if let Some(traite) = filter.traite {
        builder.push(" AND traite = ").push_bind(traite);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        builder.push(" AND (nom ILIKE ").push_bind(pattern.clone());
        builder.push(" OR email ILIKE ").push_bind(pattern.clone());
        builder.push(" OR message ILIKE ").push_bind(pattern);
        builder.push(")");
    }
}
