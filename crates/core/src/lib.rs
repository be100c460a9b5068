//! Functional core for songlake.
//!
//! Everything in this crate is pure: raw record types, the tabular model used
//! at the storage seam, the dimension and fact builders, and the traits the
//! imperative shell implements to move tables in and out of storage.

pub mod records;
pub mod serde;
pub mod storage;
pub mod table;
pub mod transform;
