//! Per-user rate limiter for incoming bot actions.
//!
//! Combines a sliding-window counter with a minimum gap between two
//! accepted actions of the same user.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::config::{RATE_LIMIT_WINDOW_SECS, RateLimitSettings};
use crate::menu::ChatSurface;

/// Transient warning shown to a flooding user.
pub const FLOOD_WARNING: &str = "⚠️ Too many requests! Please wait a moment.";

/// Verdict for a single incoming action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The action may proceed and has been recorded.
    Allowed,

    /// Arrived too soon after the previous accepted action. Dropped silently.
    Throttled,

    /// The user exhausted the window budget. Dropped with a warning.
    Flooded,
}

/// Rate limiter keyed by user id.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum duration between two accepted actions.
    min_interval: Duration,

    /// Lookback used for the per-window cap.
    window: Duration,

    /// Accepted actions allowed inside one window.
    max_per_window: usize,

    /// Accepted action timestamps per user, oldest first.
    history: Mutex<HashMap<u64, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Creates a limiter with a 60 second window.
    #[must_use]
    pub fn new(min_interval: Duration, max_per_window: usize) -> Self {
        Self {
            min_interval,
            window: Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
            max_per_window,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a limiter from configured settings.
    #[must_use]
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.min_interval(), settings.max_requests_per_minute)
    }

    /// Checks an action from `user_id` happening now.
    pub async fn check(&self, user_id: u64) -> RateDecision {
        self.check_at(user_id, Instant::now()).await
    }

    /// Checks an action from `user_id` happening at `now`.
    ///
    /// Only [`RateDecision::Allowed`] records the timestamp.
    pub async fn check_at(&self, user_id: u64, now: Instant) -> RateDecision {
        let mut history = self.history.lock().await;
        history.retain(|_, times| {
            while let Some(&oldest) = times.front() {
                if now.saturating_duration_since(oldest) < self.window {
                    break;
                }
                times.pop_front();
            }
            !times.is_empty()
        });
        let recent = history.entry(user_id).or_default();

        if recent.len() >= self.max_per_window {
            warn!(
                "User {} exceeded {} actions per {:?}",
                user_id, self.max_per_window, self.window
            );
            return RateDecision::Flooded;
        }

        if let Some(&last) = recent.back()
            && now.saturating_duration_since(last) < self.min_interval
        {
            debug!("Rate limiter: dropping rapid action from user {}", user_id);
            return RateDecision::Throttled;
        }

        recent.push_back(now);
        RateDecision::Allowed
    }

    /// Gate in front of every handler.
    ///
    /// Returns `true` if the action may proceed. A flooding user gets
    /// [`FLOOD_WARNING`] on `surface`; failing to deliver it is only logged.
    pub async fn admit<S: ChatSurface>(&self, user_id: u64, surface: &S) -> bool {
        match self.check(user_id).await {
            RateDecision::Allowed => true,
            RateDecision::Throttled => false,
            RateDecision::Flooded => {
                if let Err(e) = surface.warn(FLOOD_WARNING).await {
                    error!("Failed to send rate limit warning to {}: {}", user_id, e);
                }
                false
            }
        }
    }
}

#[cfg(test)]
impl RateLimiter {
    /// Number of accepted actions recorded for `user_id` as of the last check.
    pub(crate) async fn recorded(&self, user_id: u64) -> usize {
        self.history
            .lock()
            .await
            .get(&user_id)
            .map_or(0, VecDeque::len)
    }

    /// Users currently held in the history map.
    pub(crate) async fn tracked_users(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Forgets the history of `user_id`.
    pub(crate) async fn reset(&self, user_id: u64) {
        self.history.lock().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::recording::{Event, RecordingSurface};

    fn limiter() -> RateLimiter {
        RateLimiter::from_settings(&RateLimitSettings::default())
    }

    #[tokio::test]
    async fn test_first_action_allowed() {
        let limiter = limiter();
        assert_eq!(limiter.check(1).await, RateDecision::Allowed);
        assert_eq!(limiter.recorded(1).await, 1);
    }

    #[tokio::test]
    async fn test_rapid_taps_dropped_without_recording() {
        let limiter = limiter();
        let start = Instant::now();

        assert_eq!(limiter.check_at(1, start).await, RateDecision::Allowed);
        assert_eq!(
            limiter.check_at(1, start + Duration::from_millis(300)).await,
            RateDecision::Throttled
        );
        assert_eq!(
            limiter.check_at(1, start + Duration::from_millis(999)).await,
            RateDecision::Throttled
        );
        assert_eq!(limiter.recorded(1).await, 1);

        // The gap is measured from the last accepted action, not the dropped ones.
        assert_eq!(
            limiter.check_at(1, start + Duration::from_secs(1)).await,
            RateDecision::Allowed
        );
        assert_eq!(limiter.recorded(1).await, 2);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let limiter = limiter();
        let now = Instant::now();
        assert_eq!(limiter.check_at(1, now).await, RateDecision::Allowed);
        assert_eq!(limiter.check_at(2, now).await, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn test_flood_after_window_budget() {
        let limiter = limiter();
        let start = Instant::now();

        for i in 0..20u64 {
            let at = start + Duration::from_millis(1500 * i);
            assert_eq!(limiter.check_at(7, at).await, RateDecision::Allowed);
        }

        let at = start + Duration::from_secs(31);
        assert_eq!(limiter.check_at(7, at).await, RateDecision::Flooded);
        assert_eq!(limiter.recorded(7).await, 20);
    }

    #[tokio::test]
    async fn test_flood_checked_before_interval() {
        let limiter = limiter();
        let start = Instant::now();

        for i in 0..20u64 {
            limiter.check_at(7, start + Duration::from_secs(2 * i)).await;
        }

        // Within one second of the last accepted action, but the budget wins.
        let at = start + Duration::from_millis(38_500);
        assert_eq!(limiter.check_at(7, at).await, RateDecision::Flooded);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = limiter();
        let start = Instant::now();

        for i in 0..20u64 {
            limiter.check_at(3, start + Duration::from_secs(i)).await;
        }
        assert_eq!(limiter.recorded(3).await, 20);

        // The first entry is exactly 60s old and falls out of the window.
        let at = start + Duration::from_secs(60);
        assert_eq!(limiter.check_at(3, at).await, RateDecision::Allowed);
        assert_eq!(limiter.recorded(3).await, 20);
    }

    #[tokio::test]
    async fn test_idle_users_are_forgotten() {
        let limiter = limiter();
        let start = Instant::now();

        limiter.check_at(1, start).await;
        limiter.check_at(2, start + Duration::from_secs(30)).await;
        assert_eq!(limiter.tracked_users().await, 2);

        // User 1 has been idle for a full window by now.
        limiter.check_at(3, start + Duration::from_secs(61)).await;
        assert_eq!(limiter.tracked_users().await, 2);
        assert_eq!(limiter.recorded(1).await, 0);
        assert_eq!(limiter.recorded(2).await, 1);
    }

    #[tokio::test]
    async fn test_flooded_user_without_budget_is_not_tracked() {
        let limiter = RateLimiter::new(Duration::ZERO, 0);
        let now = Instant::now();

        assert_eq!(limiter.check_at(4, now).await, RateDecision::Flooded);
        limiter.check_at(5, now).await;
        assert_eq!(limiter.tracked_users().await, 1);
    }

    #[tokio::test]
    async fn test_reset() {
        let limiter = limiter();
        let now = Instant::now();
        limiter.check_at(5, now).await;
        assert_eq!(limiter.check_at(5, now).await, RateDecision::Throttled);

        limiter.reset(5).await;
        assert_eq!(limiter.check_at(5, now).await, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn test_admit_is_quiet_for_double_taps() {
        let limiter = limiter();
        let surface = RecordingSurface::default();

        assert!(limiter.admit(11, &surface).await);
        assert!(!limiter.admit(11, &surface).await);
        assert!(surface.events().is_empty());
    }

    #[tokio::test]
    async fn test_admit_warns_when_flooded() {
        let limiter = RateLimiter::new(Duration::ZERO, 2);
        let surface = RecordingSurface::default();

        assert!(limiter.admit(12, &surface).await);
        assert!(limiter.admit(12, &surface).await);
        assert!(!limiter.admit(12, &surface).await);

        assert_eq!(surface.events(), vec![Event::Warn(FLOOD_WARNING.to_owned())]);
        assert_eq!(limiter.recorded(12).await, 2);
    }
}
