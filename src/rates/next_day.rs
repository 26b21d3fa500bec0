//! Next-day selection
//!
//! Next-day delivery is an allow-list: only services matching one of an ordered set of name
//! patterns may be sold as next-day, whatever their stated speed.

use smallvec::SmallVec;

use crate::rates::CarrierRate;

/// Matches a service name containing every one of its terms, case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNameMatcher {
    terms: SmallVec<[String; 4]>,
}

impl ServiceNameMatcher {
    /// Build a matcher requiring all of `terms`.
    pub fn all_of<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|term| term.as_ref().trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    /// Whether `service_name` contains every term.
    pub fn matches(&self, service_name: &str) -> bool {
        let name = service_name.to_lowercase();

        !self.terms.is_empty() && self.terms.iter().all(|term| name.contains(term.as_str()))
    }
}

/// Ordered allow-list of next-day services, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextDayPolicy {
    preferences: Vec<ServiceNameMatcher>,
}

impl Default for NextDayPolicy {
    fn default() -> Self {
        Self::new([
            ServiceNameMatcher::all_of(["royal mail", "special", "delivery", "guaranteed"]),
            ServiceNameMatcher::all_of(["dpd", "next", "day"]),
            ServiceNameMatcher::all_of(["parcelforce", "express", "24"]),
        ])
    }
}

impl NextDayPolicy {
    /// Build a policy from matchers in priority order.
    pub fn new<I>(preferences: I) -> Self
    where
        I: IntoIterator<Item = ServiceNameMatcher>,
    {
        Self {
            preferences: preferences.into_iter().collect(),
        }
    }

    /// Pick the next-day service from `rates`.
    ///
    /// Quotes stating at most one day in transit are searched first; if no allow-listed
    /// service is among them, every quote is searched with the same preferences. The latter
    /// pass can pick a service whose speed is not stated.
    pub fn select<'a>(&self, rates: &'a [CarrierRate]) -> Option<&'a CarrierRate> {
        let fast: Vec<&CarrierRate> = rates
            .iter()
            .filter(|rate| rate.estimated_days.is_some_and(|days| days <= 1))
            .collect();

        self.first_preferred(fast.iter().copied())
            .or_else(|| self.first_preferred(rates.iter()))
    }

    fn first_preferred<'a, I>(&self, rates: I) -> Option<&'a CarrierRate>
    where
        I: Iterator<Item = &'a CarrierRate> + Clone,
    {
        self.preferences.iter().find_map(|matcher| {
            rates
                .clone()
                .find(|rate| matcher.matches(&rate.service_name))
        })
    }
}
