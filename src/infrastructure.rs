pub mod http;
pub mod limiter;
pub mod media;
pub mod store;
