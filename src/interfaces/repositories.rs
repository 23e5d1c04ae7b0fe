pub mod listings;
pub mod payments;
pub mod trips;
