//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples progression logic from system resources
//! (time, sleeping, randomness). The quiz observation delay and simulated
//! store latency go through it, so a simulation can run whole quiz sessions
//! in virtual time with a seeded RNG.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::{fmt::Debug, future::Future, ops::Sub, time::Duration};

/// Abstract environment providing time, randomness, and async primitives.
///
/// Implementations MUST guarantee:
///
/// 1. Time monotonicity: `now()` never goes backwards
/// 2. Minimal panics: methods are infallible except in exceptional
///    circumstances (e.g., OS entropy exhaustion, incorrect simulation setup)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Point in time as seen by this environment.
    ///
    /// Real environments use `std::time::Instant`, simulations use virtual
    /// time. Subtracting two instants yields the elapsed duration.
    type Instant: Copy + Ord + Debug + Send + Sync + Sub<Output = Duration>;

    /// Returns the current time.
    ///
    /// # Invariants
    ///
    /// - Monotonicity: Subsequent calls must return times >= previous calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code sleeps. State machines receive time through events.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// Simulation implementations MUST be deterministic for a given seed.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Generates a random duration in `[0, max)`.
    ///
    /// Used for simulated latency jitter. Returns zero when `max` is zero.
    fn random_duration(&self, max: Duration) -> Duration {
        let max_nanos = u64::try_from(max.as_nanos()).unwrap_or(u64::MAX);
        if max_nanos == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.random_u64() % max_nanos)
    }
}
