pub mod drafts;
pub mod extractors;
pub mod listings;
pub mod payments;
pub mod submission;
pub mod trips;
