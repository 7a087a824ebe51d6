//! Registry of per-session throttling state.
//!
//! Each visitor session owns one [`SessionState`]. State is created on the
//! first submission attempt and lives until the host drops idle sessions with
//! [`SessionRegistry::cleanup_idle`].

use crate::application::ports::{Clock, Storage};
use crate::domain::{inquiry::SessionId, policy::MinIntervalPolicy};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Throttling state tracked for one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Minimum-interval policy holding the last accepted submission time
    pub policy: MinIntervalPolicy,
    /// Last time this session made any attempt, accepted or not
    pub last_seen: Instant,
}

impl SessionState {
    pub fn new(policy: MinIntervalPolicy, now: Instant) -> Self {
        Self {
            policy,
            last_seen: now,
        }
    }
}

/// Registry managing all session throttling state.
///
/// Generic over the storage implementation. In production, use
/// `Arc<ShardedStorage<SessionId, SessionState>>`.
#[derive(Debug, Clone)]
pub struct SessionRegistry<S>
where
    S: Storage<SessionId, SessionState> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    template: MinIntervalPolicy,
}

impl<S> SessionRegistry<S>
where
    S: Storage<SessionId, SessionState> + Clone,
{
    /// Create a registry. New sessions start from a clone of `template`.
    pub fn new(storage: S, clock: Arc<dyn Clock>, template: MinIntervalPolicy) -> Self {
        Self {
            storage,
            clock,
            template,
        }
    }

    /// Access or create the state for a session.
    ///
    /// The callback receives the state and the current timestamp. It runs
    /// while the session's entry is locked.
    pub fn with_session<F, R>(&self, session: &SessionId, f: F) -> R
    where
        F: FnOnce(&mut SessionState, Instant) -> R,
    {
        let now = self.clock.now();
        let template = self.template.clone();
        self.storage.with_entry_mut(
            session.clone(),
            || SessionState::new(template, now),
            |state| {
                state.last_seen = now;
                f(state, now)
            },
        )
    }

    /// Drop sessions with no attempt in the last `max_idle`.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_idle(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let before = self.storage.len();
        self.storage
            .retain(|_, state| now.saturating_duration_since(state.last_seen) < max_idle);
        before.saturating_sub(self.storage.len())
    }

    /// The policy new sessions start from.
    pub fn template(&self) -> &MinIntervalPolicy {
        &self.template
    }

    /// Get the number of tracked sessions.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Clear all tracked state.
    pub fn clear(&self) {
        self.storage.clear();
    }
}
