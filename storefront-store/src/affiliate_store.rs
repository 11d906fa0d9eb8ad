//! Affiliate referral capture.
//!
//! A referral code arriving with a visit is kept for [`REFERRAL_RETENTION`]
//! and attached to orders placed in that window. Each new code is reported
//! to the API once.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::CommerceApi;
use tracing::{debug, info, warn};

use crate::kv::{KeyValueStore, keys};
use crate::persistent::PersistentStore;

/// How long a captured code stays attached to orders.
pub const REFERRAL_RETENTION: Duration = Duration::days(30);

const MAX_CODE_LEN: usize = 64;

/// A captured referral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    /// Affiliate code.
    pub code: String,
    /// When the code was captured.
    pub captured_at: DateTime<Utc>,
    /// Whether the visit was reported to the API.
    #[serde(default)]
    pub reported: bool,
}

impl Referral {
    /// Returns true if the referral is still within its retention window.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now - self.captured_at < REFERRAL_RETENTION
    }
}

/// Normalizes a raw code, rejecting empty or implausible values.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim();
    let valid = !code.is_empty()
        && code.len() <= MAX_CODE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| code.to_ascii_uppercase())
}

/// Persisted referral state.
#[derive(Debug)]
pub struct AffiliateStore {
    state: PersistentStore<Option<Referral>>,
}

impl AffiliateStore {
    /// Opens the referral persisted in `kv`.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: PersistentStore::open(kv, keys::AFFILIATE_REF),
        }
    }

    /// Captures a referral code.
    ///
    /// Returns true if the code is new. Re-capturing the active code keeps
    /// its original capture time and reporting status.
    pub fn capture(&self, raw: &str) -> bool {
        self.capture_at(raw, Utc::now())
    }

    /// Captures a referral code as of `now`.
    pub fn capture_at(&self, raw: &str, now: DateTime<Utc>) -> bool {
        let Some(code) = normalize_code(raw) else {
            warn!(code = raw, "Ignoring malformed referral code");
            return false;
        };

        let captured = self.state.update(|current| {
            if current
                .as_ref()
                .is_some_and(|r| r.code == code && r.is_active_at(now))
            {
                return false;
            }
            *current = Some(Referral {
                code: code.clone(),
                captured_at: now,
                reported: false,
            });
            true
        });

        if captured {
            info!(code = %code, "Captured referral code");
        }
        captured
    }

    /// The referral if still active.
    pub fn active(&self) -> Option<Referral> {
        let now = Utc::now();
        self.state
            .read(|r| r.as_ref().filter(|r| r.is_active_at(now)).cloned())
    }

    /// The active referral code.
    pub fn active_code(&self) -> Option<String> {
        self.active().map(|r| r.code)
    }

    /// Reports the active code to the API if it has not been reported yet.
    ///
    /// Failures are logged and retried on the next call. Returns true if a
    /// report was delivered.
    pub async fn report_pending(&self, api: &dyn CommerceApi, landing_path: &str) -> bool {
        let Some(referral) = self.active().filter(|r| !r.reported) else {
            return false;
        };

        match api.track_referral(&referral.code, landing_path).await {
            Ok(()) => {
                self.state.update(|current| match current {
                    Some(r) if r.code == referral.code => {
                        r.reported = true;
                        true
                    }
                    _ => false,
                });
                debug!(code = %referral.code, "Reported referral visit");
                true
            }
            Err(e) => {
                warn!(code = %referral.code, error = %e, "Failed to report referral visit");
                false
            }
        }
    }

    /// Forgets the captured referral.
    pub fn clear(&self) {
        self.state.reset();
    }
}
