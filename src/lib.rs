//! twig: a small local version-control core
//!
//! Content-addressed blob and commit stores, a staging index, branch
//! pointers with a HEAD, and a reconciler that moves the working directory
//! between commit snapshots.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
pub mod telemetry;

pub use areas::repository::Repository;
pub use errors::TwigError;
