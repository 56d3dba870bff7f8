use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed.
    pub allowed: bool,
    /// Maximum requests allowed in this window.
    pub limit: u32,
    /// Requests remaining in the current window (0 when denied).
    pub remaining: u32,
    /// Whole seconds until the current window resets, rounded up.
    pub reset_after_secs: u64,
}

/// A named `max` requests per `window` limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    /// 5 login attempts per IP per 15 minutes.
    pub const LOGIN: Self = Self::new(5, 15 * 60);
    /// 3 registrations per IP per hour.
    pub const REGISTER: Self = Self::new(3, 60 * 60);
    /// 30 token refreshes per IP per minute.
    pub const REFRESH: Self = Self::new(30, 60);
    /// 300 authenticated API calls per bearer token per minute.
    pub const API: Self = Self::new(300, 60);

    pub const fn new(max: u32, window_secs: u64) -> Self {
        Self {
            max,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Policies applied by the HTTP layer. Tests swap in tighter ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub login: RateLimitPolicy,
    pub register: RateLimitPolicy,
    pub refresh: RateLimitPolicy,
    pub api: RateLimitPolicy,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            login: RateLimitPolicy::LOGIN,
            register: RateLimitPolicy::REGISTER,
            refresh: RateLimitPolicy::REFRESH,
            api: RateLimitPolicy::API,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Process-wide fixed-window rate limiter keyed by arbitrary strings
/// (`"login:<ip>"`, `"api:<token-hash>"`, ...).
///
/// The first call for a key opens a window of the requested length. Calls
/// inside the window are counted until `max` is reached; later calls are
/// denied until the window ends, at which point the next call opens a fresh
/// one.
///
/// State lives in this process only. Several server instances behind a load
/// balancer each keep their own counters, so the effective limit multiplies
/// by the instance count; a shared store is needed for that deployment.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// Evict expired entries once the map exceeds this many keys.
    const EVICTION_THRESHOLD: usize = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request for `key` against `max` per `window`.
    pub fn check(&self, key: &str, max: u32, window: Duration) -> RateLimitResult {
        self.check_at(key, max, window, Instant::now())
    }

    pub fn check_policy(&self, key: &str, policy: RateLimitPolicy) -> RateLimitResult {
        self.check(key, policy.max, policy.window)
    }

    /// [`check`](Self::check) with an explicit clock reading.
    // `guard` must outlive `entry` because `entry` borrows from the HashMap behind the lock.
    #[allow(clippy::significant_drop_tightening)]
    pub fn check_at(&self, key: &str, max: u32, window: Duration, now: Instant) -> RateLimitResult {
        let mut guard = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if guard.len() > Self::EVICTION_THRESHOLD {
            guard.retain(|_, w| w.reset_at > now);
        }

        let fresh = Window {
            count: 1,
            reset_at: now + window,
        };
        let entry = guard.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: now,
        });

        // No window yet, or the previous one has ended.
        if entry.count == 0 || now >= entry.reset_at {
            *entry = fresh;
            return RateLimitResult {
                allowed: true,
                limit: max,
                remaining: max.saturating_sub(1),
                reset_after_secs: ceil_secs(window),
            };
        }

        let reset_after_secs = ceil_secs(entry.reset_at.saturating_duration_since(now));

        if entry.count >= max {
            return RateLimitResult {
                allowed: false,
                limit: max,
                remaining: 0,
                reset_after_secs,
            };
        }

        entry.count += 1;
        RateLimitResult {
            allowed: true,
            limit: max,
            remaining: max.saturating_sub(entry.count),
            reset_after_secs,
        }
    }

    /// Remove every entry whose window has ended. Returns how many were dropped.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    pub fn cleanup_at(&self, now: Instant) -> usize {
        let mut guard = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, w| w.reset_at > now);
        before - guard.len()
    }

    /// Forget the counter for one key.
    pub fn reset(&self, key: &str) {
        self.windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }

    /// Forget every counter.
    pub fn reset_all(&self) {
        self.windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Number of tracked keys, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
