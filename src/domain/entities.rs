pub mod draft;
pub mod image;
pub mod listing;
pub mod payment;
pub mod session;
pub mod trip_density;
