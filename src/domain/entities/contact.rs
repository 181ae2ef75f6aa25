use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::option_fields::OptionField;
use crate::errors::AppError;

/// The fixed set of project types a visitor can pick on the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "type_projet", rename_all = "snake_case")]
pub enum TypeProjet {
    SiteVitrine,
    AppWeb,
    Script,
    Autre,
}

/// Contact messages serialize verbatim, so the row is the wire shape.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub id: i32,
    pub nom: String,
    pub email: String,
    pub type_projet: TypeProjet,
    pub budget: Option<String>,
    pub message: String,
    pub date_envoi: DateTime<Utc>,
    pub traite: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewContactRequest {
    #[validate(length(min = 1, max = 100))]
    pub nom: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub type_projet: TypeProjet,

    #[validate(length(max = 100))]
    pub budget: Option<String>,

    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateContactRequest {
    // date_envoi is write-once and deliberately absent here.
    #[validate(length(min = 1, max = 100))]
    pub nom: OptionField<String>,

    #[validate(custom(function = "validate_optional_email"))]
    pub email: OptionField<String>,

    pub type_projet: OptionField<TypeProjet>,

    #[validate(length(max = 100))]
    pub budget: OptionField<String>,

    #[validate(length(min = 1))]
    pub message: OptionField<String>,

    pub traite: OptionField<bool>,
}

fn validate_optional_email(value: &OptionField<String>) -> Result<(), validator::ValidationError> {
    if let OptionField::SetToValue(email) = value {
        if !validator::ValidateEmail::validate_email(email) {
            return Err(validator::ValidationError::new("email"));
        }
    }
    Ok(())
}

// ───── Listing parameters ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOrderField {
    DateEnvoi,
    Nom,
}

impl ContactOrderField {
    pub fn column(&self) -> &'static str {
        match self {
            ContactOrderField::DateEnvoi => "date_envoi",
            ContactOrderField::Nom => "nom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactOrdering {
    pub field: ContactOrderField,
    pub descending: bool,
}

impl ContactOrdering {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let field = match name {
            "date_envoi" => ContactOrderField::DateEnvoi,
            "nom" => ContactOrderField::Nom,
            _ => {
                return Err(AppError::field_error(
                    "ordering",
                    format!("Cannot order contact messages by '{}'", name),
                ))
            }
        };

        Ok(ContactOrdering { field, descending })
    }

    pub fn as_sql(&self) -> String {
        format!(
            "{} {}",
            self.field.column(),
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

#[derive(Debug, Default)]
pub struct ContactFilter {
    pub type_projet: Option<TypeProjet>,
    pub traite: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<ContactOrdering>,
    pub limit: i64,
    pub offset: i64,
}
