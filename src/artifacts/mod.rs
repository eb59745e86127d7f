//! Data structures and algorithms
//!
//! - `branch`: Branch names, HEAD targets and revision parsing
//! - `checkout`: Working-directory reconciliation and conflict detection
//! - `log`: Commit history traversal
//! - `objects`: Stored object types (blob, commit)
//! - `status`: Working tree status inspection

pub mod branch;
pub mod checkout;
pub mod log;
pub mod objects;
pub mod status;
