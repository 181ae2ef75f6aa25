use std::borrow::Cow;

use actix_multipart::form::{json::Json as MpJson, tempfile::TempFile, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entities::category::Category;
use crate::entities::gallery_image::{GalleryImage, GalleryImageResponse};
use crate::entities::option_fields::OptionField;
use crate::entities::technology::{Technology, TechnologyResponse};
use crate::errors::AppError;
use crate::media::MediaStore;

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITRE_LENGTH: u64 = 200;
const MAX_SHORT_DESCRIPTION_LENGTH: u64 = 200;
const MIN_SLUG_LENGTH: u64 = 1;
const MAX_SLUG_LENGTH: u64 = 200;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: i32,
    pub titre: String,
    pub slug: String,
    pub description_courte: String,
    pub description_longue: String,
    /// Storage key of the main image.
    pub image_principale: String,
    pub categorie_id: Option<i32>,
    pub lien_github: Option<String>,
    pub lien_demo: Option<String>,
    pub date_creation: DateTime<Utc>,
    pub date_mise_a_jour: DateTime<Utc>,
    pub ordre_affichage: i32,
    pub est_publie: bool,
}

/// A project with its relations resolved.
#[derive(Debug)]
pub struct Project {
    pub row: ProjectRow,
    pub categorie: Option<Category>,
    pub technologies: Vec<Technology>,
    pub galerie_images: Vec<GalleryImage>,
}

#[derive(Debug, Validate)]
pub struct ProjectInsert {
    #[validate(length(min = 1, max = MAX_TITRE_LENGTH))]
    pub titre: String,

    #[validate(
        length(min = MIN_SLUG_LENGTH, max = MAX_SLUG_LENGTH),
        custom(function = "validate_slug")
    )]
    pub slug: String,

    #[validate(length(min = 1, max = MAX_SHORT_DESCRIPTION_LENGTH))]
    pub description_courte: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description_longue: String,

    pub image_principale: String,
    pub categorie_id: Option<i32>,

    #[validate(custom(function = "validate_url"))]
    pub lien_github: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub lien_demo: Option<String>,

    pub ordre_affichage: i32,
    pub est_publie: bool,

    pub technologies_ids: Vec<i32>,
    pub galerie_images_ids: Vec<i32>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: i32,
    pub titre: String,
    pub slug: String,
    pub description_courte: String,
    pub description_longue: String,
    pub image_principale: String,
    pub galerie_images: Vec<GalleryImageResponse>,
    pub technologies: Vec<TechnologyResponse>,
    pub categorie: Option<Category>,
    pub lien_github: Option<String>,
    pub lien_demo: Option<String>,
    pub date_creation: DateTime<Utc>,
    pub date_mise_a_jour: DateTime<Utc>,
    pub ordre_affichage: i32,
    pub est_publie: bool,
}

impl Project {
    pub fn to_response(&self, media: &MediaStore) -> ProjectResponse {
        ProjectResponse {
            id: self.row.id,
            titre: self.row.titre.clone(),
            slug: self.row.slug.clone(),
            description_courte: self.row.description_courte.clone(),
            description_longue: self.row.description_longue.clone(),
            image_principale: media.url(&self.row.image_principale),
            galerie_images: self
                .galerie_images
                .iter()
                .map(|img| img.to_response(media))
                .collect(),
            technologies: self
                .technologies
                .iter()
                .map(|tech| tech.to_response(media))
                .collect(),
            categorie: self.categorie.clone(),
            lien_github: self.row.lien_github.clone(),
            lien_demo: self.row.lien_demo.clone(),
            date_creation: self.row.date_creation,
            date_mise_a_jour: self.row.date_mise_a_jour,
            ordre_affichage: self.row.ordre_affichage,
            est_publie: self.row.est_publie,
        }
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct NewProjectRequest {
    #[validate(length(min = 1, max = MAX_TITRE_LENGTH))]
    pub titre: String,

    /// Generated from `titre` when omitted.
    #[validate(
        length(min = MIN_SLUG_LENGTH, max = MAX_SLUG_LENGTH),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = MAX_SHORT_DESCRIPTION_LENGTH))]
    pub description_courte: String,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description_longue: String,

    /// Existing storage key; the multipart variant fills this from the upload.
    pub image_principale: Option<String>,

    pub categorie_id: Option<i32>,

    #[serde(default)]
    pub technologies_ids: Vec<i32>,

    #[serde(default)]
    pub galerie_images_ids: Vec<i32>,

    #[validate(custom(function = "validate_url"))]
    pub lien_github: Option<String>,

    #[validate(custom(function = "validate_url"))]
    pub lien_demo: Option<String>,

    #[serde(default)]
    pub ordre_affichage: i32,

    #[serde(default = "default_true")]
    pub est_publie: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, MultipartForm)]
pub struct ProjectUpload {
    #[multipart(rename = "image_principale", limit = "5MB")]
    pub image_principale: TempFile,

    #[multipart(rename = "data")]
    pub data: MpJson<NewProjectRequest>,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateProjectRequest {
    // The slug is the public lookup key and stays immutable; it is
    // deliberately not part of this request.
    #[validate(length(min = 1, max = MAX_TITRE_LENGTH))]
    pub titre: OptionField<String>,

    #[validate(length(min = 1, max = MAX_SHORT_DESCRIPTION_LENGTH))]
    pub description_courte: OptionField<String>,

    #[validate(length(min = 1))]
    pub description_longue: OptionField<String>,

    pub image_principale: OptionField<String>,

    /// `null` detaches the category.
    pub categorie_id: OptionField<i32>,

    pub technologies_ids: OptionField<Vec<i32>>,

    pub galerie_images_ids: OptionField<Vec<i32>>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub lien_github: OptionField<String>,

    #[validate(custom(function = "validate_optional_url_field"))]
    pub lien_demo: OptionField<String>,

    pub ordre_affichage: OptionField<i32>,

    pub est_publie: OptionField<bool>,
}

#[derive(Debug, MultipartForm)]
pub struct ProjectUpdateUpload {
    #[multipart(rename = "image_principale", limit = "5MB")]
    pub image_principale: Option<TempFile>,

    #[multipart(rename = "data")]
    pub data: MpJson<UpdateProjectRequest>,
}

// ───── Listing parameters ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOrderField {
    DateCreation,
    OrdreAffichage,
    Titre,
}

impl ProjectOrderField {
    pub fn column(&self) -> &'static str {
        match self {
            ProjectOrderField::DateCreation => "date_creation",
            ProjectOrderField::OrdreAffichage => "ordre_affichage",
            ProjectOrderField::Titre => "titre",
        }
    }
}

/// A validated `ordering` query parameter. Anything outside the
/// whitelist is rejected instead of being silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectOrdering {
    pub field: ProjectOrderField,
    pub descending: bool,
}

impl ProjectOrdering {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let field = match name {
            "date_creation" => ProjectOrderField::DateCreation,
            "ordre_affichage" => ProjectOrderField::OrdreAffichage,
            "titre" => ProjectOrderField::Titre,
            _ => {
                return Err(AppError::field_error(
                    "ordering",
                    format!("Cannot order projects by '{}'", name),
                ))
            }
        };

        Ok(ProjectOrdering { field, descending })
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
pub struct ProjectFilter {
    pub categorie: Option<i32>,
    pub technology: Option<i32>,
    pub search: Option<String>,
    pub ordering: Option<ProjectOrdering>,
    pub limit: i64,
    pub offset: i64,
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match url::Url::parse(url) {
        Ok(parsed) => {
            if parsed.scheme() == "http" || parsed.scheme() == "https" {
                Ok(())
            } else {
                Err(new_validation_error("invalid_url_scheme", "URL must start with http:// or https://"))
            }
        }
        Err(_) => Err(new_validation_error("invalid_url", "Invalid URL format")),
    }
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(new_validation_error("slug_empty", "Slug cannot be empty"));
    }
    if !slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(new_validation_error("slug_invalid_chars", "Slug must contain only lowercase letters, digits, or hyphens"));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(new_validation_error("slug_edge_hyphen", "Slug must not start or end with a hyphen"));
    }
    if slug.contains("--") {
        return Err(new_validation_error("slug_double_hyphen", "Slug must not contain consecutive hyphens"));
    }
    Ok(())
}

pub fn validate_optional_url_field(value: &OptionField<String>) -> Result<(), ValidationError> {
    if let OptionField::SetToValue(url) = value {
        validate_url(url)?;
    }
    Ok(())
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

// ───── Conversions ──────────────────────────────────────────────────

impl TryFrom<NewProjectRequest> for ProjectInsert {
    type Error = AppError;

    fn try_from(value: NewProjectRequest) -> Result<Self, Self::Error> {
        value.validate().map_err(AppError::from)?;

        let image_principale = value.image_principale.ok_or_else(|| {
            AppError::field_error("image_principale", "A main image is required")
        })?;

        // Generate slug if not provided
        let slug = match value.slug {
            Some(s) => s,
            None => {
                let generated = slug::slugify(&value.titre);
                if generated.is_empty() {
                    return Err(AppError::field_error(
                        "slug",
                        "Could not generate a slug from the title; please provide one",
                    ));
                }
                generated
            }
        };

        let insert = ProjectInsert {
            titre: value.titre,
            slug,
            description_courte: value.description_courte,
            description_longue: value.description_longue,
            image_principale,
            categorie_id: value.categorie_id,
            lien_github: value.lien_github,
            lien_demo: value.lien_demo,
            ordre_affichage: value.ordre_affichage,
            est_publie: value.est_publie,
            technologies_ids: value.technologies_ids,
            galerie_images_ids: value.galerie_images_ids,
        };

        insert.validate().map_err(AppError::from)?;
        Ok(insert)
    }
}
