pub mod ingest;
pub mod store;

pub use ingest::{trim_csv, trim_reviews, TrimThresholds};
pub use store::InteractionStore;
