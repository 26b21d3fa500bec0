//! Order Handlers

pub(crate) mod label;
