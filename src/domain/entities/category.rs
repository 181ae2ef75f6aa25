use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::option_fields::OptionField;
use crate::entities::project::validate_slug;

/// Categories serialize as stored, so the row doubles as the wire shape.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Generated from `name` when omitted.
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateCategoryRequest {
    // The slug is the public identity of a category and stays immutable.
    #[validate(length(min = 1, max = 100))]
    pub name: OptionField<String>,
}
