// Copyright 2025 Cowboy AI, LLC.

//! Ready-made pipeline behaviors

use async_trait::async_trait;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{debug, info};

use crate::cqrs::{DispatchContext, Request};
use crate::outcome::Outcome;
use crate::pipeline::{Behavior, ErasedNext, ErasedReply, ErasedRequest, GlobalBehavior, Next};

/// Requests that can check themselves before being handled
pub trait Validate {
    /// Succeed if the request may be handled
    fn validate(&self) -> Outcome;
}

/// Short-circuits requests that fail [`Validate::validate`]
///
/// # Examples
///
/// ```rust
/// use cim_result::{success, Command, Outcome, OutcomeExt, Request, Validate, ValidationBehavior};
///
/// struct Rename { name: String }
///
/// impl Request for Rename {
///     type Output = ();
/// }
///
/// impl Command for Rename {}
///
/// impl Validate for Rename {
///     fn validate(&self) -> Outcome {
///         success()
///             .validate()
///             .rule(|_| !self.name.is_empty(), "name is required")
///             .rule(|_| self.name.len() <= 64, "name is too long")
///             .validate()
///     }
/// }
///
/// let _behavior = ValidationBehavior::<Rename>::new();
/// ```
pub struct ValidationBehavior<R> {
    _request: PhantomData<fn(R)>,
}

impl<R> ValidationBehavior<R> {
    /// A validation step for `R`
    pub fn new() -> Self {
        Self {
            _request: PhantomData,
        }
    }
}

impl<R> Default for ValidationBehavior<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Request + Validate> Behavior<R> for ValidationBehavior<R> {
    async fn handle(
        &self,
        request: R,
        _ctx: &DispatchContext,
        next: Next<'_, R>,
    ) -> Outcome<R::Output> {
        if let Err(error) = request.validate() {
            debug!(
                request = std::any::type_name::<R>(),
                failures = error.details().len(),
                "request rejected by validation"
            );
            return Err(error);
        }
        next.run(request).await
    }
}

/// Logs every dispatch with its outcome and duration
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

#[async_trait]
impl GlobalBehavior for LoggingBehavior {
    async fn handle(
        &self,
        request: ErasedRequest,
        ctx: &DispatchContext,
        next: ErasedNext<'_>,
    ) -> Outcome<ErasedReply> {
        let request_type = request.type_name();
        let started = Instant::now();
        debug!("Handling {} ({})", request_type, ctx.dispatch_id());

        let outcome = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(_) => info!("Handled {} in {}ms", request_type, elapsed_ms),
            Err(error) => info!(
                "Handling {} failed after {}ms: {}",
                request_type, elapsed_ms, error
            ),
        }
        outcome
    }
}
