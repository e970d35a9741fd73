mod collections;
mod health;
mod listings;
mod metrics;

pub use collections::collections_handler;
pub use health::health_handler;
pub use listings::{get_listing_handler, listings_handler};
pub use metrics::metrics_handler;
