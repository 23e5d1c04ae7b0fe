use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Hard cap on photos per listing, whatever the configuration says.
pub const MAX_IMAGES_PER_LISTING: usize = 8;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Path the browser loads local form previews from.
pub const PREVIEW_PATH: &str = "/api/v1/previews";
