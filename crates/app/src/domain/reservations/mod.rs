//! Reservations

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod sweeper;

pub use errors::ReservationsServiceError;
pub use service::*;
pub use sweeper::PgReservationSweeper;
