//! Orders
//!
//! Orders are owned elsewhere; this module only reads and writes their delivery fields.

pub mod records;
pub(crate) mod repository;
