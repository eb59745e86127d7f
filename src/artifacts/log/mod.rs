//! Commit history traversal
//!
//! - `rev_list`: lazy first-parent walk from a commit back to the root
//!
//! History is linear: each commit has at most one parent, so the walk is
//! iterative and never revisits a commit.

pub mod rev_list;
