use serde::{Deserialize, Serialize};

use crate::entities::listing::ListingRecord;

/// Whether the account has used up its free listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequirement {
    pub requires_payment: bool,
    #[serde(default)]
    pub active_listings_count: u32,
    #[serde(default)]
    pub free_listings_remaining: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Listing,
    PromoteListing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub payment_type: PaymentType,
    pub listing_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// Response of the hosted-checkout session endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub requires_payment: Option<bool>,
}

impl CheckoutSession {
    /// The redirect target, if the session is usable.
    pub fn redirect_url(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.checkout_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub active_listings_count: u32,
    pub monthly_charge: f64,
    pub price_per_listing: f64,
    pub currency: String,
    pub free_listings_limit: u32,
    pub paid_listings_count: u32,
}

/// Where to send the browser after a checkout session was issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutRedirect {
    pub listing_id: String,
    pub checkout_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// What the post-checkout page shows for a listing.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatus {
    pub listing_id: String,
    pub active: bool,
    pub listing: ListingRecord,
}
