//! Three-phase action protocol
//!
//! Every operation that touches the gateway runs through [`orchestrate`]:
//! the owning store is marked pending, the work runs, and the store is
//! resolved to fulfilled or rejected. Failures never escape as errors;
//! they become [`Settled::Rejected`] with a user-facing message.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ClientResult;

/// Lifecycle phase of the most recent action on a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing dispatched yet
    #[default]
    Idle,
    /// An action is in flight
    Pending,
    /// The last action succeeded
    Fulfilled,
    /// The last action failed
    Rejected,
}

/// Resolved outcome of one action
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Settled<T> {
    Fulfilled(T),
    Rejected(String),
}

impl<T> Settled<T> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settled::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Settled::Rejected(_))
    }

    /// The value, if fulfilled
    pub fn value(&self) -> Option<&T> {
        match self {
            Settled::Fulfilled(value) => Some(value),
            Settled::Rejected(_) => None,
        }
    }

    /// The error message, if rejected
    pub fn error(&self) -> Option<&str> {
        match self {
            Settled::Fulfilled(_) => None,
            Settled::Rejected(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Settled::Fulfilled(value) => Ok(value),
            Settled::Rejected(message) => Err(message),
        }
    }
}

/// Identifier of an orchestrated operation
pub trait Action: Copy + std::fmt::Debug {
    /// Short name used in logs and in [`ActionStatus::action`]
    fn name(&self) -> &'static str;

    /// Message stored when a failure carries no backend detail
    fn fallback_message(&self) -> &'static str;
}

/// Lifecycle bookkeeping embedded in every store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionStatus {
    phase: Phase,
    action: Option<&'static str>,
    error: Option<String>,
}

impl ActionStatus {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Name of the most recently dispatched action
    pub fn action(&self) -> Option<&'static str> {
        self.action
    }

    /// Error of the last rejected action; cleared when a new one starts
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.phase == Phase::Pending
    }

    fn begin(&mut self, action: &'static str) {
        self.phase = Phase::Pending;
        self.action = Some(action);
        self.error = None;
    }

    fn fulfil(&mut self) {
        self.phase = Phase::Fulfilled;
    }

    fn reject(&mut self, message: String) {
        self.phase = Phase::Rejected;
        self.error = Some(message);
    }
}

/// A store whose lifecycle is driven by [`orchestrate`]
pub trait Tracked {
    fn status_mut(&mut self) -> &mut ActionStatus;
}

/// Run `execute` under the pending/fulfilled/rejected protocol
///
/// The lock is not held while `execute` runs, so the gateway is free to
/// invalidate the same store on a 401. On success `apply` runs under the
/// lock together with the transition to fulfilled.
pub async fn orchestrate<S, A, T, R, Fut, F>(
    state: &Mutex<S>,
    action: A,
    execute: Fut,
    apply: F,
) -> Settled<R>
where
    S: Tracked,
    A: Action,
    Fut: Future<Output = ClientResult<T>>,
    F: FnOnce(&mut S, T) -> R,
{
    state.lock().await.status_mut().begin(action.name());
    debug!(action = action.name(), "Action pending");

    let outcome = execute.await;

    let mut guard = state.lock().await;
    match outcome {
        Ok(value) => {
            guard.status_mut().fulfil();
            info!(action = action.name(), "Action fulfilled");
            Settled::Fulfilled(apply(&mut *guard, value))
        }
        Err(e) => {
            let message = e.user_message(action.fallback_message());
            warn!(action = action.name(), error = %e, "Action rejected: {}", message);
            guard.status_mut().reject(message.clone());
            Settled::Rejected(message)
        }
    }
}
