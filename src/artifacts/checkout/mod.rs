//! Checkout operations and conflict handling
//!
//! Switching the working directory to another commit is planned in full
//! before any file is touched:
//! - every working-directory file is classified against the current and target snapshots
//! - untracked files the target would overwrite with different content are conflicts
//! - only a conflict-free plan is applied (deletions first, then writes)

pub mod migration;
