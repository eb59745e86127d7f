//! Core repository components
//!
//! - `database`: Content-addressed store, used for both blobs and commits
//! - `index`: Staging area of pending additions and removals
//! - `refs`: Branch pointers and HEAD
//! - `repository`: Owner of all components for one working tree
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
