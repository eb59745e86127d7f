//! Stored object types
//!
//! Everything twig persists in its object stores is an object identified by
//! the SHA-1 hash of its serialized form. There are two kinds:
//!
//! - **Blob**: raw file content
//! - **Commit**: a full snapshot of tracked paths plus message, timestamp and parent
//!
//! Both serialize to `<type> <size>\0<content>`.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
