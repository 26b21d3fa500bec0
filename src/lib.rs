//! Despatch
//!
//! Despatch is the delivery scheduling core of the storefront: UK working-day arithmetic,
//! carrier rate normalisation and selection, timed-slot capacity rules and the reservation
//! state machine. Everything in this crate is pure; persistence and transport live in
//! `despatch-app`.

pub mod calendar;
pub mod options;
pub mod prelude;
pub mod rates;
pub mod reservations;
pub mod slots;
