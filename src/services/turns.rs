//! Per-session turn sequencing.
//!
//! DESIGN
//! ======
//! Every submission bumps its session's turn counter and remembers the new
//! number. When the upstream exchange finishes, its result is only applied if
//! that number is still the session's latest; otherwise a newer submission
//! has superseded it and the result is discarded. Idle sessions are pruned on
//! each submission.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

const DEFAULT_IDLE_TTL_SECS: u64 = 3600;

#[derive(Clone)]
pub struct TurnTracker {
    inner: Arc<Mutex<HashMap<Uuid, SessionTurns>>>,
    idle_ttl: Duration,
}

struct SessionTurns {
    latest: u64,
    touched: Instant,
}

impl Default for TurnTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::with_idle_ttl(Duration::from_secs(DEFAULT_IDLE_TTL_SECS))
    }

    #[must_use]
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), idle_ttl }
    }

    /// Start a new turn for `session` and return its number (1-based).
    pub fn begin(&self, session: Uuid) -> u64 {
        self.begin_at(session, Instant::now())
    }

    fn begin_at(&self, session: Uuid, now: Instant) -> u64 {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let ttl = self.idle_ttl;
        inner.retain(|_, turns| now.saturating_duration_since(turns.touched) < ttl);

        let turns = inner
            .entry(session)
            .or_insert(SessionTurns { latest: 0, touched: now });
        turns.latest += 1;
        turns.touched = now;
        turns.latest
    }

    /// Latest turn number issued for `session`, if it is still tracked.
    #[must_use]
    pub fn latest(&self, session: Uuid) -> Option<u64> {
        let inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.get(&session).map(|turns| turns.latest)
    }

    /// Number of tracked sessions.
    #[must_use]
    pub fn sessions(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
#[path = "turns_test.rs"]
mod tests;
