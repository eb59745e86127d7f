//! Command implementations
//!
//! - `porcelain`: User-facing version control workflows (add, commit, checkout, etc.)

pub mod porcelain;
