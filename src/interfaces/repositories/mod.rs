pub mod category;
pub mod contact;
pub mod gallery_image;
pub mod project;
pub mod sqlx_repo;
pub mod technology;
pub mod token;
pub mod user;
