//! State

use std::sync::Arc;

use despatch_app::context::AppContext;
use jiff::Timestamp;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    clock: fn() -> Timestamp,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext) -> Self {
        Self::with_clock(app, Timestamp::now)
    }

    /// State whose handlers read the time from `clock`.
    #[must_use]
    pub(crate) fn with_clock(app: AppContext, clock: fn() -> Timestamp) -> Self {
        Self { app, clock }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self::new(app))
    }

    /// The instant a request is evaluated at.
    pub(crate) fn now(&self) -> Timestamp {
        (self.clock)()
    }
}
