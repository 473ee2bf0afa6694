//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod collect;
pub mod dispatch;
pub mod run_council;
