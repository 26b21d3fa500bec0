//! Shipping Labels

pub mod errors;
pub mod service;

pub use errors::LabelsServiceError;
pub use service::*;
