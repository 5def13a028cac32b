//! Index loading, validation and inspection.

pub mod loader;
pub mod stats;
pub mod types;
pub mod validate;

pub use loader::load_index;
pub use types::SearchIndex;
