use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::{
    constants::PREVIEW_PATH,
    domain::validation::{validate_listing, ValidationReport},
    entities::{
        draft::{DraftUpdate, DraftView, ListingForm},
        image::{ImageDescriptor, LocalImage, PickedFile},
        session::AccessToken,
    },
    errors::AppError,
    media::{
        image_check::{inspect_image, ImageError, ImagePolicy},
        previews::{Preview, PreviewRegistry},
    },
    repositories::listings::ListingsRepository,
    store::draft_store::{CheckoutError, DraftStore},
};

/// Manages open listing forms: creating them, applying edits, accepting
/// photos and handing them out for submission.
pub struct DraftHandler<L>
where
    L: ListingsRepository,
{
    pub listings_repo: L,
    pub store: DraftStore,
    pub previews: PreviewRegistry,
    pub policy: ImagePolicy,
}

impl<L> DraftHandler<L>
where
    L: ListingsRepository,
{
    pub fn new(listings_repo: L, store: DraftStore, previews: PreviewRegistry, policy: ImagePolicy) -> Self {
        DraftHandler {
            listings_repo,
            store,
            previews,
            policy,
        }
    }

    /// Opens a blank form for `owner`. Refused once the store or the
    /// owner has reached the open-form cap.
    pub fn create_draft(&self, owner: &AccessToken) -> Result<DraftView, AppError> {
        let form = ListingForm::new();
        let view = form.view(PREVIEW_PATH);
        let id = self.store.insert(owner.fingerprint(), form)?;

        tracing::info!(form_id = %id, "Listing form opened");
        Ok(view)
    }

    /// Opens an edit form pre-filled from an existing listing.
    pub async fn open_edit_draft(&self, token: &AccessToken, listing_id: &str) -> Result<DraftView, AppError> {
        let record = self.listings_repo.get_listing(token, listing_id).await?;

        let form = ListingForm::for_record(record);
        let view = form.view(PREVIEW_PATH);
        let id = self.store.insert(token.fingerprint(), form)?;

        tracing::info!(form_id = %id, listing_id = %listing_id, "Edit form opened");
        Ok(view)
    }

    /// Exclusive access to a form. Fails with 409 while another request
    /// (typically a submission) holds it.
    pub fn checkout(&self, form_id: Uuid) -> Result<OwnedMutexGuard<ListingForm>, AppError> {
        self.store.checkout(&form_id).map_err(|e| match e {
            CheckoutError::Missing => AppError::NotFound(format!("Form {} not found", form_id)),
            CheckoutError::Busy => {
                AppError::Conflict("This form is already being submitted".to_string())
            }
        })
    }

    pub fn view(&self, form_id: Uuid) -> Result<DraftView, AppError> {
        let form = self.checkout(form_id)?;
        Ok(form.view(PREVIEW_PATH))
    }

    pub fn update(&self, form_id: Uuid, update: DraftUpdate) -> Result<DraftView, AppError> {
        let mut form = self.checkout(form_id)?;
        ensure_editable(&form)?;

        form.apply(update);
        Ok(form.view(PREVIEW_PATH))
    }

    /// Checks every picked file and attaches them all, or none.
    pub fn attach_images(&self, form_id: Uuid, files: Vec<PickedFile>) -> Result<DraftView, AppError> {
        let mut form = self.checkout(form_id)?;
        ensure_editable(&form)?;

        if form.listing.images.len() + files.len() > self.policy.max_images {
            return Err(ImageError::TooManyImages(self.policy.max_images).into());
        }

        let checked = files
            .into_iter()
            .map(|file| {
                inspect_image(&file.file_name, &file.data, self.policy.max_bytes)
                    .map(|image_type| (file, image_type))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (file, image_type) in checked {
            let data: Arc<[u8]> = Arc::from(file.data);
            form.attach(LocalImage::new(file.file_name, image_type, data, &self.previews));
        }

        tracing::debug!(form_id = %form_id, images = form.listing.images.len(), "Photos attached");
        Ok(form.view(PREVIEW_PATH))
    }

    /// Removes a photo from the form. A photo already on the CDN is
    /// deleted there first; if that fails the form keeps it.
    pub async fn remove_image(
        &self,
        token: &AccessToken,
        form_id: Uuid,
        index: usize,
    ) -> Result<DraftView, AppError> {
        let mut form = self.checkout(form_id)?;
        ensure_editable(&form)?;

        let public_id = match form.listing.images.get(index) {
            None => return Err(AppError::NotFound(format!("No photo at position {}", index))),
            Some(ImageDescriptor::Persisted(img)) => Some(img.cld_public_id.clone()),
            Some(ImageDescriptor::Local(_)) => None,
        };

        if let Some(public_id) = public_id {
            self.listings_repo.delete_photo(token, &public_id).await?;
        }

        form.detach(index);
        Ok(form.view(PREVIEW_PATH))
    }

    pub fn validate(&self, form_id: Uuid) -> Result<ValidationReport, AppError> {
        let mut form = self.checkout(form_id)?;
        form.touch();
        Ok(validate_listing(&form.listing))
    }

    /// Closes a form and releases its previews.
    pub fn discard(&self, form_id: Uuid) -> Result<(), AppError> {
        let mut form = self.checkout(form_id)?;
        let released = form.release_previews();
        self.store.remove(&form_id);

        tracing::info!(form_id = %form_id, released, "Listing form discarded");
        Ok(())
    }

    /// Forgets a form once its submission has finished.
    pub fn finish(&self, form_id: Uuid) {
        self.store.remove(&form_id);
    }

    pub fn preview(&self, preview_id: &Uuid) -> Option<Preview> {
        self.previews.get(preview_id)
    }

    /// Drops forms idle for longer than `ttl`.
    pub fn purge_idle(&self, ttl: Duration) -> usize {
        self.store.purge_idle(Utc::now() - ttl)
    }
}

fn ensure_editable(form: &ListingForm) -> Result<(), AppError> {
    if form.state().is_terminal() {
        return Err(AppError::Conflict("This form has already been submitted".to_string()));
    }
    Ok(())
}
