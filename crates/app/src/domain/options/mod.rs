//! Delivery Options

pub mod service;

pub use service::*;
