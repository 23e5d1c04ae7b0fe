use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::validation::validate_phone;
use crate::entities::image::{ImageDescriptor, ImageUpload, PersistedImage};

// ───── Enumerations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    Rental,
    Sale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListingCategory {
    #[default]
    Vehicle,
    Plate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FuelType {
    #[default]
    Gas,
    Hybrid,
    Electric,
    Diesel,
}

// ───── Listed items ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: u32,
    pub color: String,
    pub fuel: FuelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Vehicle {
    /// What a fresh vehicle form starts with.
    pub fn form_defaults() -> Self {
        Vehicle {
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: Utc::now().year(),
            mileage: 0,
            color: String::new(),
            fuel: FuelType::Gas,
            details: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Plate {
    pub plate_number: String,
    pub base_number: String,
}

/// The listed item, keyed by `listing_category` on the wire:
/// `{"listing_category": "Vehicle", "item": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "listing_category", content = "item")]
pub enum ListingItem {
    Vehicle(Vehicle),
    Plate(Plate),
}

impl ListingItem {
    pub fn defaults_for(category: ListingCategory) -> Self {
        match category {
            ListingCategory::Vehicle => ListingItem::Vehicle(Vehicle::form_defaults()),
            ListingCategory::Plate => ListingItem::Plate(Plate::default()),
        }
    }

    pub fn category(&self) -> ListingCategory {
        match self {
            ListingItem::Vehicle(_) => ListingCategory::Vehicle,
            ListingItem::Plate(_) => ListingCategory::Plate,
        }
    }

    /// Applies the fields that belong to the current item kind and ignores
    /// the rest.
    pub fn apply(&mut self, fields: ItemFields) {
        match self {
            ListingItem::Vehicle(vehicle) => {
                if let Some(make) = fields.make {
                    vehicle.make = make;
                }
                if let Some(model) = fields.model {
                    vehicle.model = model;
                }
                if let Some(year) = fields.year {
                    vehicle.year = year;
                }
                if let Some(mileage) = fields.mileage {
                    vehicle.mileage = mileage;
                }
                if let Some(color) = fields.color {
                    vehicle.color = color;
                }
                if let Some(fuel) = fields.fuel {
                    vehicle.fuel = fuel;
                }
                if let Some(details) = fields.details {
                    vehicle.details = Some(details).filter(|d| !d.is_empty());
                }
            }
            ListingItem::Plate(plate) => {
                if let Some(plate_number) = fields.plate_number {
                    plate.plate_number = plate_number;
                }
                if let Some(base_number) = fields.base_number {
                    plate.base_number = base_number;
                }
            }
        }
    }
}

/// Field-by-field item update coming from the form.
#[derive(Debug, Default, Deserialize)]
pub struct ItemFields {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<u32>,
    pub color: Option<String>,
    pub fuel: Option<FuelType>,
    pub details: Option<String>,
    pub plate_number: Option<String>,
    pub base_number: Option<String>,
}

// ───── Location & contact ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingLocation {
    pub county: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Contact {
    #[validate(custom(
        function = "validate_phone",
        message = "Phone number must have 10 digits"
    ))]
    pub phone: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

// ───── Form model ───────────────────────────────────────────────────

/// The listing as it is being edited in a form.
#[derive(Debug, Validate)]
pub struct Listing {
    #[validate(length(min = 3, max = 42, message = "Title must be between 3 and 42 characters"))]
    pub title: String,

    #[validate(length(
        min = 25,
        max = 1000,
        message = "Description must be between 25 and 1000 characters"
    ))]
    pub description: String,

    pub transaction_type: TransactionType,

    pub item: ListingItem,

    pub price: f64,

    pub location: ListingLocation,

    #[validate(nested)]
    pub contact: Contact,

    pub active: bool,

    pub images: Vec<ImageDescriptor>,
}

impl Default for Listing {
    fn default() -> Self {
        Listing {
            title: String::new(),
            description: String::new(),
            transaction_type: TransactionType::Rental,
            item: ListingItem::defaults_for(ListingCategory::Vehicle),
            price: 0.0,
            location: ListingLocation {
                state: "NY".to_string(),
                ..ListingLocation::default()
            },
            contact: Contact::default(),
            active: true,
            images: Vec::new(),
        }
    }
}

impl Listing {
    pub fn category(&self) -> ListingCategory {
        self.item.category()
    }

    /// Switching category starts the item over from that category's defaults.
    pub fn set_category(&mut self, category: ListingCategory) {
        if self.category() != category {
            self.item = ListingItem::defaults_for(category);
        }
    }

    pub fn local_image_count(&self) -> usize {
        self.images.iter().filter(|img| img.is_local()).count()
    }

    /// Drops every local photo, releasing its preview. Persisted photos stay.
    pub fn release_local_images(&mut self) -> usize {
        let before = self.images.len();
        self.images.retain(|img| !img.is_local());
        before - self.images.len()
    }

    /// Builds the create/update request, with the given visibility.
    pub fn to_upload(&self, active: bool) -> ListingUpload {
        let mut persisted = Vec::new();
        let mut files = Vec::new();

        for image in &self.images {
            match image {
                ImageDescriptor::Persisted(img) => persisted.push(img.clone()),
                ImageDescriptor::Local(img) => files.push(ImageUpload::from(img)),
            }
        }

        ListingUpload {
            listing: ListingPayload {
                title: self.title.clone(),
                description: self.description.clone(),
                transaction_type: self.transaction_type,
                item: self.item.clone(),
                price: self.price,
                location: self.location.clone(),
                contact: self.contact.clone(),
                active,
                images: persisted,
            },
            images: files,
        }
    }
}

impl From<ListingRecord> for Listing {
    fn from(record: ListingRecord) -> Self {
        Listing {
            title: record.title,
            description: record.description,
            transaction_type: record.transaction_type,
            item: record.item,
            price: record.price,
            location: record.location,
            contact: record.contact,
            active: record.active,
            images: record
                .images
                .into_iter()
                .map(ImageDescriptor::Persisted)
                .collect(),
        }
    }
}

// ───── Wire models ──────────────────────────────────────────────────

/// The `listing` JSON part of a create/update upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPayload {
    pub title: String,
    pub description: String,
    pub transaction_type: TransactionType,
    #[serde(flatten)]
    pub item: ListingItem,
    pub price: f64,
    pub location: ListingLocation,
    pub contact: Contact,
    pub active: bool,
    pub images: Vec<PersistedImage>,
}

/// A complete multipart upload: the `listing` JSON part plus one `images`
/// file part per local photo.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingUpload {
    pub listing: ListingPayload,
    pub images: Vec<ImageUpload>,
}

/// A listing as stored by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(flatten)]
    pub item: ListingItem,
    pub price: f64,
    #[serde(default)]
    pub location: ListingLocation,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub images: Vec<PersistedImage>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    pub listings: Vec<ListingRecord>,
    pub total: u64,
}

/// Browse query forwarded to the remote API. `q` is an opaque JSON filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub q: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

impl ListingQuery {
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = self.per_page.clamp(1, 100);
        self
    }
}
