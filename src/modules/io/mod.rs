pub mod export;
pub mod loader;

pub use export::{export_matches_to_csv, export_matches_to_json};
pub use loader::{load_records, load_records_from_csv, load_records_from_json};
