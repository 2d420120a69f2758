//! Baseline snapshots of watched associations.
//!
//! ## Responsibilities
//!
//! - Capture independent copies of an association's records per (type, association)
//! - Hand back the latest capture, or nothing once cleared
//! - Digest captured records so two captures can be compared cheaply
//! - Diff a capture against the live records
//!
//! ## Non-Responsibilities
//!
//! - Persistence (snapshots live for the process only)
//! - Deciding when to capture (left to the caller)

pub mod cache;
pub mod compare;
pub mod digest;

pub use cache::{AssociationSnapshot, SnapshotCache};
pub use compare::{compare, ModifiedRecord, SnapshotDelta};
pub use digest::compute_records_digest;
