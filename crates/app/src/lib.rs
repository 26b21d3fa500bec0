//! Delivery scheduling services: the slot store, the reservation state machine, carrier rate
//! gateway, label purchasing and the delivery option facade.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod locks;

#[cfg(test)]
mod test;

mod uuids;
