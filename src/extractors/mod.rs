// src/extractors/mod.rs
pub mod beds;
pub mod tables;

// Re-export key extraction entry points for convenience
pub use beds::normalize_table;
pub use tables::{locate_section_tables, SECTION_IDS};
