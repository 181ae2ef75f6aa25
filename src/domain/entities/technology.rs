use actix_multipart::form::{json::Json as MpJson, tempfile::TempFile, MultipartForm};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::option_fields::OptionField;
use crate::media::MediaStore;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Technology {
    pub id: i32,
    pub name: String,
    /// Storage key of the logo, if one was uploaded.
    pub logo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TechnologyResponse {
    pub id: i32,
    pub name: String,
    pub logo: Option<String>,
}

impl Technology {
    pub fn to_response(&self, media: &MediaStore) -> TechnologyResponse {
        TechnologyResponse {
            id: self.id,
            name: self.name.clone(),
            logo: media.url_opt(self.logo.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewTechnologyRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Existing storage key; the multipart variant fills this from the upload.
    pub logo: Option<String>,
}

#[derive(Debug, MultipartForm)]
pub struct TechnologyUpload {
    #[multipart(rename = "logo", limit = "5MB")]
    pub logo: Option<TempFile>,

    #[multipart(rename = "data")]
    pub data: MpJson<NewTechnologyRequest>,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(default)]
pub struct UpdateTechnologyRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: OptionField<String>,

    /// `null` removes the logo.
    pub logo: OptionField<String>,
}
