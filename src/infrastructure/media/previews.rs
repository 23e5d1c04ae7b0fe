use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::entities::image::ImageType;

#[derive(Debug, Clone)]
pub struct Preview {
    pub image_type: ImageType,
    pub data: Arc<[u8]>,
}

/// Holds the in-memory previews of photos picked in open forms.
///
/// Entries only live as long as the `PreviewHandle` returned by
/// `register`, so a preview can never outlive the form image it belongs to.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<DashMap<Uuid, Preview>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, image_type: ImageType, data: Arc<[u8]>) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.entries.insert(id, Preview { image_type, data });
        tracing::debug!(preview_id = %id, "Registered image preview");

        PreviewHandle {
            id,
            entries: Arc::clone(&self.entries),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Preview> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Number of previews currently held.
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}

/// Owner of one registered preview. Dropping it releases the preview.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    entries: Arc<DashMap<Uuid, Preview>>,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if self.entries.remove(&self.id).is_some() {
            tracing::debug!(preview_id = %self.id, "Released image preview");
        }
    }
}
