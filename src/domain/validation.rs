use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::constants::MAX_IMAGES_PER_LISTING;
use crate::entities::image::ImageDescriptor;
use crate::entities::listing::{Listing, ListingCategory};

const PHONE_DIGITS: usize = 10;

static PHONE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9()+.\s-]+$").expect("phone pattern is valid"));

/// Outcome of checking a listing before submission. Field keys use dotted
/// paths for nested fields (`contact.phone`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn from_errors(field_errors: BTreeMap<String, String>) -> Self {
        ValidationReport {
            valid: field_errors.is_empty(),
            field_errors,
        }
    }
}

/// Checks a listing without touching anything else. The same listing
/// always yields the same report.
pub fn validate_listing(listing: &Listing) -> ValidationReport {
    let mut field_errors = BTreeMap::new();

    if let Err(errors) = listing.validate() {
        collect_field_errors("", &errors, &mut field_errors);
    }

    if let Err(error) = validate_price(listing.price) {
        field_errors.insert("price".to_string(), message_of(&error));
    }

    if let Err(error) = validate_listing_images(listing.category(), &listing.images) {
        field_errors
            .entry("images".to_string())
            .or_insert_with(|| message_of(&error));
    }

    ValidationReport::from_errors(field_errors)
}

/// Vehicles need at least one photo, plates do not. No listing holds more
/// than the photo cap.
pub fn validate_listing_images(
    category: ListingCategory,
    images: &[ImageDescriptor],
) -> Result<(), ValidationError> {
    if category == ListingCategory::Vehicle && images.is_empty() {
        let mut error = ValidationError::new("images_required");
        error.message = Some("Add at least one photo of the vehicle".into());
        return Err(error);
    }

    if images.len() > MAX_IMAGES_PER_LISTING {
        let mut error = ValidationError::new("images_limit");
        error.message =
            Some(format!("A listing can hold at most {} photos", MAX_IMAGES_PER_LISTING).into());
        return Err(error);
    }

    Ok(())
}

/// US phone numbers: exactly ten digits, punctuation allowed.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();

    if !PHONE_CHARS.is_match(phone) || digits != PHONE_DIGITS {
        let mut error = ValidationError::new("phone_format");
        error.message = Some("Phone number must have 10 digits".into());
        return Err(error);
    }

    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price <= 0.0 {
        let mut error = ValidationError::new("price_range");
        error.message = Some("Price must be greater than 0".into());
        return Err(error);
    }

    Ok(())
}

fn collect_field_errors(prefix: &str, errors: &ValidationErrors, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(first) = field_errors.first() {
                    out.entry(key).or_insert_with(|| message_of(first));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(&format!("{}[{}]", key, index), inner, out);
                }
            }
        }
    }
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Invalid value".to_string())
}
