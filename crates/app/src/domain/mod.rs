//! Delivery Domain Concerns

pub mod labels;
pub mod options;
pub mod orders;
pub mod rates;
pub mod reservations;
pub mod slots;
