pub mod category;
pub mod contact;
pub mod gallery_image;
pub mod option_fields;
pub mod project;
pub mod technology;
pub mod token;
pub mod user;
