use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::image::{ImageDescriptor, ImageView, LocalImage};
use crate::entities::listing::{
    Contact, ItemFields, Listing, ListingCategory, ListingItem, ListingLocation, ListingRecord,
    TransactionType,
};

/// Whether a form creates a new listing or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit { listing_id: String },
}

/// Where a form is in the submission sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum SubmissionState {
    Editing,
    Validating,
    CheckingPayment,
    Creating { active: bool },
    Saving,
    RedirectingToCheckout { listing_id: String, checkout_url: String },
    Done { listing_id: String },
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Done { .. } | SubmissionState::RedirectingToCheckout { .. }
        )
    }
}

/// One open listing form.
#[derive(Debug)]
pub struct ListingForm {
    pub id: Uuid,
    pub mode: FormMode,
    pub listing: Listing,
    state: SubmissionState,
    last_touched: DateTime<Utc>,
}

impl ListingForm {
    pub fn new() -> Self {
        ListingForm {
            id: Uuid::new_v4(),
            mode: FormMode::Create,
            listing: Listing::default(),
            state: SubmissionState::Editing,
            last_touched: Utc::now(),
        }
    }

    pub fn for_record(record: ListingRecord) -> Self {
        let listing_id = record.id.clone();
        ListingForm {
            mode: FormMode::Edit { listing_id },
            listing: Listing::from(record),
            ..Self::new()
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn transition(&mut self, next: SubmissionState) {
        tracing::debug!(form_id = %self.id, from = ?self.state, to = ?next, "Form state change");
        self.state = next;
        self.touch();
    }

    pub fn last_touched(&self) -> DateTime<Utc> {
        self.last_touched
    }

    pub fn touch(&mut self) {
        self.last_touched = Utc::now();
    }

    pub fn apply(&mut self, update: DraftUpdate) {
        let listing = &mut self.listing;

        if let Some(title) = update.title {
            listing.title = title;
        }
        if let Some(description) = update.description {
            listing.description = description;
        }
        if let Some(transaction_type) = update.transaction_type {
            listing.transaction_type = transaction_type;
        }
        if let Some(category) = update.listing_category {
            listing.set_category(category);
        }
        if let Some(item) = update.item {
            listing.item.apply(item);
        }
        if let Some(price) = update.price {
            listing.price = price;
        }
        if let Some(location) = update.location {
            listing.location = location;
        }
        if let Some(contact) = update.contact {
            listing.contact = contact;
        }

        self.touch();
    }

    pub fn attach(&mut self, image: LocalImage) {
        self.listing.images.push(ImageDescriptor::Local(image));
        self.touch();
    }

    /// Removes the image at `index`, releasing its preview if it was local.
    pub fn detach(&mut self, index: usize) -> Option<ImageDescriptor> {
        if index >= self.listing.images.len() {
            return None;
        }
        self.touch();
        Some(self.listing.images.remove(index))
    }

    pub fn release_previews(&mut self) -> usize {
        self.listing.release_local_images()
    }

    pub fn view(&self, preview_base: &str) -> DraftView {
        let listing = &self.listing;
        DraftView {
            id: self.id,
            mode: self.mode.clone(),
            state: self.state.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            transaction_type: listing.transaction_type,
            item: listing.item.clone(),
            price: listing.price,
            location: listing.location.clone(),
            contact: listing.contact.clone(),
            active: listing.active,
            images: listing
                .images
                .iter()
                .enumerate()
                .map(|(index, image)| ImageView::from_descriptor(index, image, preview_base))
                .collect(),
            updated_at: self.last_touched,
        }
    }
}

impl Default for ListingForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial form update; absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
pub struct DraftUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub listing_category: Option<ListingCategory>,
    pub item: Option<ItemFields>,
    pub price: Option<f64>,
    pub location: Option<ListingLocation>,
    pub contact: Option<Contact>,
}

#[derive(Debug, Serialize)]
pub struct DraftView {
    pub id: Uuid,
    pub mode: FormMode,
    pub state: SubmissionState,
    pub title: String,
    pub description: String,
    pub transaction_type: TransactionType,
    #[serde(flatten)]
    pub item: ListingItem,
    pub price: f64,
    pub location: ListingLocation,
    pub contact: Contact,
    pub active: bool,
    pub images: Vec<ImageView>,
    pub updated_at: DateTime<Utc>,
}
