pub mod drafts;
pub mod home;
pub mod listings;
pub mod payments;
pub mod previews;
pub mod system;
pub mod trips;
