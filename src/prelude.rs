//! Despatch prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    calendar::{CalendarError, WorkingCalendar},
    options::{DeliveryOption, DeliveryTier, TierPricing, UnknownDeliveryTier, display_price},
    rates::{
        CarrierRate, NextDayPolicy, QualifyingRate, ServiceNameMatcher, cheapest_qualifying,
        prefer_service, qualifying_rates, select_standard,
    },
    reservations::{
        ConfirmAction, ReleaseAction, ReservationStatus, cancel_action, confirm_action,
        sweep_action,
    },
    slots::{SlotAvailability, TimeWindow},
};
