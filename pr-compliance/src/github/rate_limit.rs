//! Rate limiting utilities for the GitHub REST API.
//!
//! GitHub signals an exhausted quota with `403 Forbidden` plus
//! `X-RateLimit-Remaining: 0`. `X-RateLimit-Reset` holds the Unix timestamp
//! at which requests are accepted again.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Header carrying the remaining request count.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the reset timestamp.
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Header carrying the window size.
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Assumed time to reset when GitHub omits the reset header.
const DEFAULT_RESET_SECS: u64 = 60;

/// Added to every computed wait so the retry lands after the reset.
const RESET_GRACE_SECS: u64 = 1;

/// Upper bound on a single cool-down.
pub const MAX_WAIT_SECS: u64 = 3600;

/// Rate limit information read from response headers.
///
/// Every field is optional; GitHub only sends the headers on API responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: Option<u32>,

    /// Unix timestamp when the rate limit resets.
    pub reset: Option<u64>,

    /// Total requests allowed per window.
    pub limit: Option<u32>,
}

impl RateLimitInfo {
    /// Reads the `X-RateLimit-*` headers. Missing or malformed values become `None`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            remaining: header_number(headers, REMAINING_HEADER),
            reset: header_number(headers, RESET_HEADER),
            limit: header_number(headers, LIMIT_HEADER),
        }
    }

    /// Returns true when GitHub reported zero remaining requests.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Computes how long to wait before retrying: `max(reset - now, 0) + 1s`.
    ///
    /// Without a reset header the reset is assumed to be 60 seconds after `now`.
    pub fn wait_duration(&self, now: SystemTime) -> Duration {
        let now = now.duration_since(UNIX_EPOCH).unwrap_or_default();
        let reset = self
            .reset
            .map(Duration::from_secs)
            .unwrap_or_else(|| now + Duration::from_secs(DEFAULT_RESET_SECS));

        reset
            .saturating_sub(now)
            .saturating_add(Duration::from_secs(RESET_GRACE_SECS))
    }
}

/// Returns true for the one response combination that triggers a cool-down.
pub fn is_rate_limited(status: StatusCode, info: &RateLimitInfo) -> bool {
    status == StatusCode::FORBIDDEN && info.is_exhausted()
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Process-wide rate limit cool-down shared by every clone of a fetcher.
///
/// A rate-limited request pushes the resume instant forward. Every other
/// request waits for that instant before going out, so one cool-down is
/// honoured globally rather than per worker.
#[derive(Debug, Default)]
pub struct RateLimitGate {
    resume_at: Mutex<Option<Instant>>,
}

impl RateLimitGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until any active cool-down has elapsed.
    pub async fn ready(&self) {
        let resume_at = *self.resume_at.lock().await;
        if let Some(resume_at) = resume_at {
            if resume_at > Instant::now() {
                debug!("Waiting for shared rate limit cool-down");
                tokio::time::sleep_until(resume_at).await;
            }
        }
    }

    /// Closes the gate for `wait` (or longer, if a later cool-down is already
    /// active) and waits for it to reopen. Waits are capped at [`MAX_WAIT_SECS`].
    pub async fn cool_down(&self, wait: Duration) {
        let max_wait = Duration::from_secs(MAX_WAIT_SECS);
        if wait > max_wait {
            warn!(
                wait_secs = wait.as_secs(),
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }

        let requested = Instant::now() + wait.min(max_wait);
        let resume_at = {
            let mut guard = self.resume_at.lock().await;
            let resume_at = guard.map_or(requested, |current| current.max(requested));
            *guard = Some(resume_at);
            resume_at
        };

        tokio::time::sleep_until(resume_at).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use std::sync::Arc;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn parses_rate_limit_headers() {
        let info = RateLimitInfo::from_headers(&headers(&[
            ("x-ratelimit-remaining", "0"),
            ("x-ratelimit-reset", "1700000000"),
            ("x-ratelimit-limit", "5000"),
        ]));

        assert_eq!(info.remaining, Some(0));
        assert_eq!(info.reset, Some(1_700_000_000));
        assert_eq!(info.limit, Some(5000));
        assert!(info.is_exhausted());
    }

    #[test]
    fn malformed_headers_are_ignored() {
        let info = RateLimitInfo::from_headers(&headers(&[("x-ratelimit-remaining", "lots")]));
        assert_eq!(info, RateLimitInfo::default());
        assert!(!info.is_exhausted());
    }

    #[test]
    fn waits_until_reset_plus_grace() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let info = RateLimitInfo {
            remaining: Some(0),
            reset: Some(1_010),
            limit: None,
        };

        assert_eq!(info.wait_duration(now), Duration::from_secs(11));
    }

    #[test]
    fn past_reset_still_waits_grace() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let info = RateLimitInfo {
            remaining: Some(0),
            reset: Some(900),
            limit: None,
        };

        assert_eq!(info.wait_duration(now), Duration::from_secs(1));
    }

    #[test]
    fn missing_reset_falls_back_to_a_minute() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let info = RateLimitInfo {
            remaining: Some(0),
            reset: None,
            limit: None,
        };

        assert_eq!(info.wait_duration(now), Duration::from_secs(61));
    }

    #[test]
    fn only_forbidden_with_zero_remaining_is_rate_limited() {
        let exhausted = RateLimitInfo {
            remaining: Some(0),
            ..RateLimitInfo::default()
        };
        let plenty = RateLimitInfo {
            remaining: Some(10),
            ..RateLimitInfo::default()
        };

        assert!(is_rate_limited(StatusCode::FORBIDDEN, &exhausted));
        assert!(!is_rate_limited(StatusCode::FORBIDDEN, &plenty));
        assert!(!is_rate_limited(StatusCode::TOO_MANY_REQUESTS, &exhausted));
        assert!(!is_rate_limited(StatusCode::OK, &exhausted));
    }

    #[tokio::test(start_paused = true)]
    async fn cool_down_holds_other_requests() {
        let gate = Arc::new(RateLimitGate::new());
        let start = Instant::now();

        let cooling = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.cool_down(Duration::from_secs(30)).await })
        };
        tokio::task::yield_now().await;

        gate.ready().await;
        assert!(start.elapsed() >= Duration::from_secs(30));
        cooling.await.unwrap();
    }

    #[test]
    fn far_future_reset_does_not_overflow() {
        let info = RateLimitInfo {
            remaining: Some(0),
            reset: Some(u64::MAX),
            limit: None,
        };

        assert!(
            info.wait_duration(SystemTime::now()) > Duration::from_secs(MAX_WAIT_SECS)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cool_down_is_capped() {
        let gate = RateLimitGate::new();
        let start = Instant::now();
        let wait = RateLimitInfo {
            remaining: Some(0),
            reset: Some(u64::MAX),
            limit: None,
        }
        .wait_duration(SystemTime::now());

        gate.cool_down(wait).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(MAX_WAIT_SECS));
        assert!(elapsed < Duration::from_secs(MAX_WAIT_SECS + 1));
    }

    #[tokio::test(start_paused = true)]
    async fn open_gate_does_not_wait() {
        let gate = RateLimitGate::new();
        let start = Instant::now();

        gate.ready().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
