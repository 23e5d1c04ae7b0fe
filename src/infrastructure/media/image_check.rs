use derive_more::Display;
use infer::Infer;

use crate::entities::image::ImageType;

/// Limits applied to every photo picked for a listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePolicy {
    pub max_bytes: usize,
    pub max_images: usize,
}

/// Checks a picked file before it is accepted into a form.
///
/// - `file_name`: name reported by the browser, used in error messages only
/// - `data`: the file content; its type is sniffed, the declared type is ignored
/// - `max_size`: max size in bytes
pub fn inspect_image(file_name: &str, data: &[u8], max_size: usize) -> Result<ImageType, ImageError> {
    // 1. Emptiness
    if data.is_empty() {
        return Err(ImageError::EmptyFile(file_name.to_string()));
    }

    // 2. Size ceiling
    if data.len() > max_size {
        return Err(ImageError::FileTooLarge {
            file_name: file_name.to_string(),
            max_bytes: max_size,
        });
    }

    // 3. MIME detection from content
    let infer = Infer::new();
    match infer.get(data) {
        Some(kind) => ImageType::from_mime(kind.mime_type()).ok_or_else(|| {
            ImageError::InvalidType {
                file_name: file_name.to_string(),
                detected: kind.mime_type().to_string(),
            }
        }),
        None => Err(ImageError::InvalidType {
            file_name: file_name.to_string(),
            detected: "unknown".to_string(),
        }),
    }
}

/// Rejections raised while accepting photos into a form.
#[derive(Debug, Display, PartialEq)]
pub enum ImageError {
    #[display("{_0} is empty")]
    EmptyFile(String),

    #[display("{file_name} exceeds the {max_bytes} byte limit")]
    FileTooLarge { file_name: String, max_bytes: usize },

    #[display("{file_name} is not a JPEG, PNG or WebP image (detected {detected})")]
    InvalidType { file_name: String, detected: String },

    #[display("A listing can hold at most {_0} photos")]
    TooManyImages(usize),
}
