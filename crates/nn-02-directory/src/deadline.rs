//! Time budget for one directory call.
//!
//! Every blocking step of a call (connect, each command) takes its timeout
//! from the same `Deadline`, so the call as a whole never outlives the
//! configured budget. Writes go through `commit`: once the caller has given
//! up on a call, `commit` refuses, so a write reported as dropped never
//! reaches the store afterwards.

use crate::error::DirectoryError;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

const PENDING: u8 = 0;
const COMMITTED: u8 = 1;
const ABANDONED: u8 = 2;

#[derive(Debug)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
    state: AtomicU8,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
            state: AtomicU8::new(PENDING),
        }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left for the next blocking step. Fails once the budget is spent
    /// or the caller has abandoned the call.
    pub fn remaining(&self, op: &'static str) -> Result<Duration, DirectoryError> {
        if self.state.load(Ordering::Acquire) == ABANDONED {
            return Err(self.expired(op));
        }
        let left = self.at.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(self.expired(op));
        }
        Ok(left)
    }

    /// Claim the right to send a write. Call immediately before the write
    /// leaves for the store.
    pub fn commit(&self, op: &'static str) -> Result<(), DirectoryError> {
        self.remaining(op)?;
        match self
            .state
            .compare_exchange(PENDING, COMMITTED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(COMMITTED) => Ok(()),
            Err(_) => Err(self.expired(op)),
        }
    }

    /// Give up on the call. `false` when a write was already committed and
    /// may still land, in which case the caller must wait for the outcome.
    pub fn abandon(&self) -> bool {
        match self
            .state
            .compare_exchange(PENDING, ABANDONED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(ABANDONED) => true,
            Err(_) => false,
        }
    }

    pub fn expired(&self, op: &'static str) -> DirectoryError {
        DirectoryError::Timeout {
            op,
            timeout_ms: self.budget.as_millis() as u64,
        }
    }
}
