use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use derive_more::Display;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::entities::draft::ListingForm;

/// Why a form could not be checked out of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    Missing,
    Busy,
}

/// Why a new form was refused.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionError {
    #[display("Too many listing forms are open right now ({})", _0)]
    StoreFull(usize),

    #[display("You already have {} listing forms open; finish or discard one first", _0)]
    OwnerLimit(usize),
}

/// How many forms may be open at once, overall and per caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub max_forms: usize,
    pub max_per_owner: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        StoreLimits {
            max_forms: 500,
            max_per_owner: 5,
        }
    }
}

struct Slot {
    owner: u64,
    form: Arc<Mutex<ListingForm>>,
}

/// In-memory home of open listing forms, keyed by form id.
///
/// Each form sits behind its own async mutex. A request works on a form by
/// checking it out with [`DraftStore::checkout`]; a second request for the
/// same form while the first holds it is refused rather than queued.
#[derive(Clone)]
pub struct DraftStore {
    forms: Arc<DashMap<Uuid, Slot>>,
    limits: StoreLimits,
    admission: Arc<parking_lot::Mutex<()>>,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::with_limits(StoreLimits::default())
    }
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: StoreLimits) -> Self {
        DraftStore {
            forms: Arc::new(DashMap::new()),
            limits,
            admission: Arc::new(parking_lot::Mutex::new(())),
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Adds a form on behalf of `owner`, unless that would exceed either cap.
    pub fn insert(&self, owner: u64, form: ListingForm) -> Result<Uuid, AdmissionError> {
        // Count-then-insert must not interleave with another admission.
        let _admission = self.admission.lock();

        if self.forms.len() >= self.limits.max_forms {
            return Err(AdmissionError::StoreFull(self.limits.max_forms));
        }

        let owned = self.forms.iter().filter(|slot| slot.owner == owner).count();
        if owned >= self.limits.max_per_owner {
            return Err(AdmissionError::OwnerLimit(owned));
        }

        let id = form.id;
        self.forms.insert(
            id,
            Slot {
                owner,
                form: Arc::new(Mutex::new(form)),
            },
        );
        Ok(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.forms.contains_key(id)
    }

    pub fn checkout(&self, id: &Uuid) -> Result<OwnedMutexGuard<ListingForm>, CheckoutError> {
        // Clone the Arc out so the shard lock is not held while locking the form.
        let form = self
            .forms
            .get(id)
            .map(|slot| Arc::clone(&slot.form))
            .ok_or(CheckoutError::Missing)?;

        form.try_lock_owned().map_err(|_| CheckoutError::Busy)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.forms.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Drops forms untouched since `cutoff`. Forms checked out by a request
    /// are skipped. Returns how many were dropped.
    pub fn purge_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.forms.len();

        self.forms.retain(|_, slot| match slot.form.try_lock() {
            Ok(form) => form.last_touched() >= cutoff,
            Err(_) => true,
        });

        before.saturating_sub(self.forms.len())
    }
}
