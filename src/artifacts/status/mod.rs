//! Working tree status inspection
//!
//! Compares the working directory against the staging index and the HEAD
//! commit.
//!
//! - `file_change`: kinds of unstaged change
//! - `status_info`: status collection

pub mod file_change;
pub mod status_info;
