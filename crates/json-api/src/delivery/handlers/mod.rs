//! Delivery Handlers

pub(crate) mod cancel;
pub(crate) mod confirm;
pub(crate) mod options;
pub(crate) mod reserve;
pub(crate) mod slots;
