//! Fixed-counter sliding window rate limiting.
//!
//! One counter is kept per `(identifier, class, campaign)` triple. The
//! decision itself ([`evaluate`]) is a pure function; stores call it inside
//! their atomic check-and-record section so concurrent attempts on the same
//! key cannot lose updates.
//!
//! A denied attempt writes nothing: the stored counter clamps at
//! `max_attempts` and `last_attempt` does not slide, so a client hammering
//! the endpoint frees up exactly one window after its last *admitted*
//! attempt.

use crate::types::CampaignId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which request property a counter tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentifierClass {
    /// Client IP address (as extracted from proxy headers)
    Ip,
    /// Submitted email address
    Email,
}

impl IdentifierClass {
    /// Storage representation of the class
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "IP",
            Self::Email => "EMAIL",
        }
    }

    /// Parse the storage representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IP" => Some(Self::Ip),
            "EMAIL" => Some(Self::Email),
            _ => None,
        }
    }
}

impl fmt::Display for IdentifierClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of one rate counter.
///
/// The same identifier string tracks independently per class and per
/// campaign; identifiers are opaque (no email case folding, no IPv6
/// canonicalization).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LimiterKey {
    /// The tracked identifier (IP string or email)
    pub identifier: String,
    /// Which property the identifier is
    pub class: IdentifierClass,
    /// The campaign being entered
    pub campaign_id: CampaignId,
}

impl LimiterKey {
    /// Key for a client IP counter.
    #[must_use]
    pub fn ip(identifier: impl Into<String>, campaign_id: CampaignId) -> Self {
        Self {
            identifier: identifier.into(),
            class: IdentifierClass::Ip,
            campaign_id,
        }
    }

    /// Key for an email counter.
    #[must_use]
    pub fn email(identifier: impl Into<String>, campaign_id: CampaignId) -> Self {
        Self {
            identifier: identifier.into(),
            class: IdentifierClass::Email,
            campaign_id,
        }
    }
}

/// Limit parameters: at most `max_attempts` admitted per `window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatePolicy {
    /// Admitted attempts per window; expected >= 1
    pub max_attempts: u32,
    /// Window length measured from the last admitted attempt
    pub window: Duration,
}

impl RatePolicy {
    /// Build a policy from whole seconds.
    #[must_use]
    pub fn per_seconds(max_attempts: u32, window_secs: i64) -> Self {
        Self {
            max_attempts,
            window: Duration::seconds(window_secs),
        }
    }
}

impl Default for RatePolicy {
    /// Three attempts per sixty seconds.
    fn default() -> Self {
        Self::per_seconds(3, 60)
    }
}

/// Persisted state of one counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttemptWindow {
    /// Admitted attempts in the current window; never exceeds the policy max
    pub attempts: u32,
    /// Instant of the last admitted attempt
    pub last_attempt: DateTime<Utc>,
}

/// Outcome of a rate-gate evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Admitted; `next` is the counter state the store must persist
    Allow {
        /// Counter state after this attempt
        next: AttemptWindow,
    },
    /// Denied; nothing may be written
    Deny {
        /// Whole seconds until the window frees up, rounded up; >= 1
        retry_after_secs: u32,
    },
}

impl Gate {
    /// Whether the attempt was admitted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

/// Decide whether an attempt is admitted and what the counter becomes.
///
/// Rules, in order:
/// 1. no record → admit, counter starts at 1
/// 2. window elapsed (`now - last_attempt >= window`, boundary inclusive)
///    → admit, counter resets to 1
/// 3. counter below the max → admit, counter increments, window slides to
///    `now`
/// 4. otherwise → deny with `ceil` of the remaining window in seconds,
///    computed at millisecond precision so 1 ms of residue still reports a
///    full second
#[must_use]
pub fn evaluate(current: Option<AttemptWindow>, policy: &RatePolicy, now: DateTime<Utc>) -> Gate {
    let Some(window) = current else {
        return Gate::Allow {
            next: AttemptWindow {
                attempts: 1,
                last_attempt: now,
            },
        };
    };

    let elapsed = now - window.last_attempt;
    if elapsed >= policy.window {
        return Gate::Allow {
            next: AttemptWindow {
                attempts: 1,
                last_attempt: now,
            },
        };
    }

    if window.attempts < policy.max_attempts {
        return Gate::Allow {
            next: AttemptWindow {
                attempts: window.attempts + 1,
                last_attempt: now,
            },
        };
    }

    let remaining_ms = (window.last_attempt + policy.window - now).num_milliseconds();
    Gate::Deny {
        retry_after_secs: ceil_seconds(remaining_ms),
    }
}

/// Round a positive millisecond count up to whole seconds, floor 1.
fn ceil_seconds(ms: i64) -> u32 {
    let secs = (ms.max(1) as u64).div_ceil(1000);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
