// src/extractors/mod.rs
pub mod spending;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use spending::{classify, RawRow, RowKind, SpendingExtractor, SpendingRecord};
