use std::{fmt, sync::Arc};

use actix_multipart::form::{bytes::Bytes, MultipartForm};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::media::previews::{PreviewHandle, PreviewRegistry};

/// Image formats a listing photo may be uploaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Jpeg,
    Png,
    Webp,
}

impl ImageType {
    pub const ALLOWED: [ImageType; 3] = [ImageType::Jpeg, ImageType::Png, ImageType::Webp];

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Webp => "image/webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALLOWED.into_iter().find(|t| t.mime_type() == mime)
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

// ───── Descriptors ──────────────────────────────────────────────────

/// A listing photo is either still local to the form or already hosted
/// by the image CDN. Never both.
#[derive(Debug)]
pub enum ImageDescriptor {
    Local(LocalImage),
    Persisted(PersistedImage),
}

impl ImageDescriptor {
    pub fn is_local(&self) -> bool {
        matches!(self, ImageDescriptor::Local(_))
    }
}

/// A file picked in the form but not uploaded yet. Owns its preview;
/// dropping the image releases the preview.
#[derive(Debug)]
pub struct LocalImage {
    pub file_name: String,
    pub image_type: ImageType,
    pub data: Arc<[u8]>,
    preview: PreviewHandle,
}

impl LocalImage {
    pub fn new(
        file_name: impl Into<String>,
        image_type: ImageType,
        data: Arc<[u8]>,
        previews: &PreviewRegistry,
    ) -> Self {
        let preview = previews.register(image_type, Arc::clone(&data));
        LocalImage {
            file_name: file_name.into(),
            image_type,
            data,
            preview,
        }
    }

    pub fn preview_id(&self) -> Uuid {
        self.preview.id()
    }
}

/// A photo already stored on the image CDN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedImage {
    pub name: String,
    pub src: String,
    pub cld_public_id: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default, deserialize_with = "size_from_string_or_number")]
    pub file_size: u64,
}

/// Uploaded sizes arrive as numbers from the upload widget and as
/// strings from older records.
fn size_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    match Size::deserialize(deserializer)? {
        Size::Number(n) => Ok(n),
        Size::Text(s) if s.trim().is_empty() => Ok(0),
        Size::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A file as received from the browser, before any checks.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// `multipart/form-data` body of a photo upload: one or more `images` parts.
#[derive(Debug, MultipartForm)]
pub struct ImagesUpload {
    pub images: Vec<Bytes>,
}

impl ImagesUpload {
    pub fn into_files(self) -> Vec<PickedFile> {
        self.images
            .into_iter()
            .enumerate()
            .map(|(i, part)| PickedFile {
                file_name: part
                    .file_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| format!("image-{}", i + 1)),
                data: part.data.to_vec(),
            })
            .collect()
    }
}

// ───── Upload parts ─────────────────────────────────────────────────

/// A single `images` file part of a listing upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Arc<[u8]>,
}

impl From<&LocalImage> for ImageUpload {
    fn from(img: &LocalImage) -> Self {
        ImageUpload {
            file_name: img.file_name.clone(),
            content_type: img.image_type.mime_type(),
            data: Arc::clone(&img.data),
        }
    }
}

/// What the browser gets back to render a form photo.
#[derive(Debug, Serialize)]
pub struct ImageView {
    pub index: usize,
    pub name: String,
    pub src: String,
    pub local: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cld_public_id: Option<String>,
}

impl ImageView {
    pub fn from_descriptor(index: usize, image: &ImageDescriptor, preview_base: &str) -> Self {
        match image {
            ImageDescriptor::Local(img) => ImageView {
                index,
                name: img.file_name.clone(),
                src: format!("{}/{}", preview_base.trim_end_matches('/'), img.preview_id()),
                local: true,
                cld_public_id: None,
            },
            ImageDescriptor::Persisted(img) => ImageView {
                index,
                name: img.name.clone(),
                src: img.src.clone(),
                local: false,
                cld_public_id: Some(img.cld_public_id.clone()),
            },
        }
    }
}
