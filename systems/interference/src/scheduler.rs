//! Per-session queue of delayed effects.

use std::time::Duration;

use snake_overseer_core::SessionId;

/// Queue of fire-once effects that belong to a single session.
///
/// Every pending effect is tagged with the session that scheduled it. Starting
/// a new session or tearing one down cancels everything still outstanding, so
/// no delayed effect can leak into a later session.
#[derive(Debug)]
pub struct Scheduler<T> {
    session: Option<SessionId>,
    pending: Vec<Scheduled<T>>,
}

#[derive(Debug)]
struct Scheduled<T> {
    due: Duration,
    session: SessionId,
    effect: T,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            session: None,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    /// Creates an idle scheduler that accepts no effects until a session begins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the scheduler to `session`, cancelling effects from any earlier session.
    pub fn begin(&mut self, session: SessionId) {
        let _ = self.cancel_all();
        self.session = Some(session);
    }

    /// Cancels everything and detaches from the current session.
    ///
    /// Returns the number of effects that were cancelled.
    pub fn end(&mut self) -> usize {
        self.session = None;
        self.cancel_all()
    }

    /// Queues `effect` to fire once the clock reaches `due`.
    ///
    /// Returns `false` and drops the effect when no session is active.
    pub fn schedule(&mut self, due: Duration, effect: T) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        self.pending.push(Scheduled {
            due,
            session,
            effect,
        });
        true
    }

    /// Removes and returns every effect due at `now`, earliest first.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let Some(session) = self.session else {
            return Vec::new();
        };

        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due <= now {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|scheduled| scheduled.due);
        due.into_iter()
            .filter(|scheduled| scheduled.session == session)
            .map(|scheduled| scheduled.effect)
            .collect()
    }

    /// Number of effects still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled pending delayed effects");
        }
        self.pending.clear();
        cancelled
    }
}
