//! Extraction schema shared by every provider and by the consensus merge.

pub mod schema;

pub use schema::{KeyClaim, KeyFinding, Methodology, StructuredExtraction};
