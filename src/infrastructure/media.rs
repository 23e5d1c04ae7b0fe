pub mod image_check;
pub mod previews;
