// Copyright 2025 Cowboy AI, LLC.

//! # Requests, commands, queries and notifications
//!
//! Everything the mediator dispatches is a plain data object. A [`Request`]
//! names its output type; [`Command`] and [`Query`] mark which side of the
//! read/write split a request sits on. A [`Notification`] fans out to any number
//! of handlers.
//!
//! Each dispatch runs with a [`DispatchContext`] carrying message identity
//! (dispatch, correlation and causation IDs) and a [`CancellationToken`].

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

/// A request routed to exactly one handler
///
/// # Examples
///
/// ```rust
/// use cim_result::{Command, Request};
///
/// struct PlaceOrder {
///     customer: String,
///     lines: Vec<(String, u32)>,
/// }
///
/// impl Request for PlaceOrder {
///     type Output = u64;
/// }
///
/// impl Command for PlaceOrder {}
/// ```
pub trait Request: Send + 'static {
    /// Value carried by a successful outcome
    type Output: Send + 'static;
}

/// A request that changes state
pub trait Command: Request {}

/// A request that reads state
pub trait Query: Request {}

/// A message delivered to every registered handler
pub trait Notification: Clone + Send + Sync + 'static {}

/// Identifier of one dispatch (UUID v7, time ordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchId(pub Uuid);

impl DispatchId {
    /// Create a new time-ordered dispatch ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation ID shared by every dispatch started from the same root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(pub Uuid);

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "correlation:{}", self.0)
    }
}

/// The dispatch that caused this one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CausationId(pub Uuid);

impl fmt::Display for CausationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "causation:{}", self.0)
    }
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation signal handed to handlers and behaviors
///
/// The mediator only passes the token along; handlers decide when to check it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<CancelState>,
}

impl CancellationToken {
    /// A token that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Identity and cancellation for one dispatch
///
/// Root contexts correlate to themselves; [`child`](DispatchContext::child)
/// continues the correlation and records the parent as the cause.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    dispatch_id: DispatchId,
    correlation_id: CorrelationId,
    causation_id: CausationId,
    issued_at: DateTime<Utc>,
    cancellation: CancellationToken,
}

impl DispatchContext {
    /// A root context with a fresh token
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// A root context using `cancellation`
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        let dispatch_id = DispatchId::new();
        Self {
            dispatch_id,
            correlation_id: CorrelationId(dispatch_id.0),
            causation_id: CausationId(dispatch_id.0),
            issued_at: Utc::now(),
            cancellation,
        }
    }

    /// A context for a dispatch caused by this one; shares the token
    pub fn child(&self) -> Self {
        Self {
            dispatch_id: DispatchId::new(),
            correlation_id: self.correlation_id,
            causation_id: CausationId(self.dispatch_id.0),
            issued_at: Utc::now(),
            cancellation: self.cancellation.clone(),
        }
    }

    /// This dispatch
    pub fn dispatch_id(&self) -> DispatchId {
        self.dispatch_id
    }

    /// Correlation shared with the root dispatch
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// The dispatch that caused this one (itself for roots)
    pub fn causation_id(&self) -> CausationId {
        self.causation_id
    }

    /// When the context was created
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// The cancellation token
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Shortcut for `cancellation().is_cancelled()`
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::new()
    }
}
