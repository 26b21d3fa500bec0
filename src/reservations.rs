//! Reservation state machine
//!
//! Reservations move `reserved -> confirmed` or `reserved -> expired`; both targets are
//! terminal. The functions here decide what a stored reservation should do next; applying the
//! decision (and pairing it with the slot count change) is the caller's job.

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;

/// Raised when a stored status label is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown reservation status: {0}")]
pub struct UnknownReservationStatus(pub String);

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    /// Holding one unit of slot capacity until it expires.
    Reserved,

    /// Attached to an order; permanently consumes its unit.
    Confirmed,

    /// Lapsed or cancelled; its unit has been released.
    Expired,
}

impl ReservationStatus {
    /// The label stored for this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reserved => "reserved",
            Self::Confirmed => "confirmed",
            Self::Expired => "expired",
        }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Expired)
    }

    /// Whether moving from `self` to `next` is allowed.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Reserved, Self::Confirmed | Self::Expired)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = UnknownReservationStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "reserved" => Ok(Self::Reserved),
            "confirmed" => Ok(Self::Confirmed),
            "expired" => Ok(Self::Expired),
            other => Err(UnknownReservationStatus(other.to_string())),
        }
    }
}

/// Whether a hold ending at `expires_at` has lapsed by `now`.
pub fn has_lapsed(expires_at: Timestamp, now: Timestamp) -> bool {
    expires_at <= now
}

/// When a hold taken at `now` for `hold` lapses.
///
/// # Errors
///
/// Returns an error if the timestamp overflows.
pub fn hold_expiry(now: Timestamp, hold: SignedDuration) -> Result<Timestamp, jiff::Error> {
    now.checked_add(hold)
}

/// What a confirm request does to a stored reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Already confirmed: return it unchanged.
    AlreadyConfirmed,

    /// Live hold: confirm it.
    Confirm,

    /// Hold lapsed: expire it, release its unit and report the expiry.
    Expire,

    /// Expired: cannot be confirmed.
    Reject,
}

/// Decide how to confirm a reservation in `status` holding until `expires_at`.
pub fn confirm_action(
    status: ReservationStatus,
    expires_at: Timestamp,
    now: Timestamp,
) -> ConfirmAction {
    match status {
        ReservationStatus::Confirmed => ConfirmAction::AlreadyConfirmed,
        terminal if terminal.is_terminal() => ConfirmAction::Reject,
        _ if has_lapsed(expires_at, now) => ConfirmAction::Expire,
        _ => ConfirmAction::Confirm,
    }
}

/// What a cancel or sweep does to a stored reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    /// Expire it and give its unit back to the slot.
    Release,

    /// Leave it untouched.
    Skip,
}

/// Cancelling only affects live holds.
pub fn cancel_action(status: ReservationStatus) -> ReleaseAction {
    if status.can_transition_to(ReservationStatus::Expired) {
        ReleaseAction::Release
    } else {
        ReleaseAction::Skip
    }
}

/// The sweep releases holds that are still `reserved` and have lapsed.
///
/// Re-checked under the row lock so a concurrent confirm or a second sweeper wins at most
/// once.
pub fn sweep_action(
    status: ReservationStatus,
    expires_at: Timestamp,
    now: Timestamp,
) -> ReleaseAction {
    if status.can_transition_to(ReservationStatus::Expired) && has_lapsed(expires_at, now) {
        ReleaseAction::Release
    } else {
        ReleaseAction::Skip
    }
}
