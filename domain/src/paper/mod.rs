//! Paper-level inputs handed to the council by the indexing pipeline.

pub mod request;

pub use request::{ExtractionRequest, ItemType};
