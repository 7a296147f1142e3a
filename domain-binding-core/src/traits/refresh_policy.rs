//! When a list read should poll providers

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Decides whether the reconciliation pass triggered by a list read polls a
/// given domain.
pub trait RefreshPolicy: Send + Sync {
    /// `last_polled` is the last time this process polled the domain, if ever.
    fn should_poll(&self, last_polled: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool;
}

/// Poll on every list read.
#[derive(Debug, Default, Clone, Copy)]
pub struct RefreshOnRead;

impl RefreshPolicy for RefreshOnRead {
    fn should_poll(&self, _last_polled: Option<DateTime<Utc>>, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Poll only if the previous poll is older than the interval.
#[derive(Debug, Clone, Copy)]
pub struct MinPollInterval(pub Duration);

impl RefreshPolicy for MinPollInterval {
    fn should_poll(&self, last_polled: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last) = last_polled else {
            return true;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed >= self.0,
            // clock went backwards
            Err(_) => true,
        }
    }
}

/// List reads never poll; something else calls `reconcile_organization`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExternalRefresh;

impl RefreshPolicy for ExternalRefresh {
    fn should_poll(&self, _last_polled: Option<DateTime<Utc>>, _now: DateTime<Utc>) -> bool {
        false
    }
}
