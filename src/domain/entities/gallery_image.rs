use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use serde::Serialize;

use crate::media::MediaStore;

/// A reusable gallery image, attached to projects through a join table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GalleryImage {
    pub id: i32,
    /// Storage key of the image file.
    pub image: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GalleryImageResponse {
    pub id: i32,
    pub image: String,
    pub description: Option<String>,
}

impl GalleryImage {
    pub fn to_response(&self, media: &MediaStore) -> GalleryImageResponse {
        GalleryImageResponse {
            id: self.id,
            image: media.url(&self.image),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, MultipartForm)]
pub struct GalleryImageUpload {
    #[multipart(rename = "image", limit = "5MB")]
    pub image: TempFile,

    #[multipart(rename = "description")]
    pub description: Option<Text<String>>,
}
