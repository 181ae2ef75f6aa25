use validator::Validate;

use crate::{
    entities::contact::{Contact, ContactFilter, NewContactRequest, UpdateContactRequest},
    errors::AppError,
    repositories::contact::ContactRepository,
};

pub struct ContactHandler<R>
where
    R: ContactRepository,
{
    pub contact_repo: R,
}

impl<R> ContactHandler<R>
where
    R: ContactRepository,
{
    pub fn new(contact_repo: R) -> Self {
        ContactHandler { contact_repo }
    }

    /// Handles a submission from the public contact form.
    pub async fn create_contact(&self, form: NewContactRequest) -> Result<Contact, AppError> {
        form.validate().map_err(AppError::from)?;
        self.contact_repo.create_contact(&form).await
    }

    pub async fn get_contact(&self, id: i32) -> Result<Contact, AppError> {
        self.contact_repo.get_contact_by_id(id).await
    }

    pub async fn list_contacts(&self, filter: &ContactFilter) -> Result<(Vec<Contact>, i64), AppError> {
        self.contact_repo.list_contacts(filter).await
    }

    pub async fn update_contact(
        &self,
        id: i32,
        changes: UpdateContactRequest,
    ) -> Result<Contact, AppError> {
        changes.validate().map_err(AppError::from)?;

        for (field, null_requested) in [
            ("nom", changes.nom.is_set_to_null()),
            ("email", changes.email.is_set_to_null()),
            ("type_projet", changes.type_projet.is_set_to_null()),
            ("message", changes.message.is_set_to_null()),
            ("traite", changes.traite.is_set_to_null()),
        ] {
            if null_requested {
                return Err(AppError::field_error(field, "Field cannot be null"));
            }
        }

        self.contact_repo.update_contact(id, &changes).await
    }

    pub async fn delete_contact(&self, id: i32) -> Result<(), AppError> {
        self.contact_repo.delete_contact(id).await
    }
}
