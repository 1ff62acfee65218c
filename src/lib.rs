// Copyright 2025 Cowboy AI, LLC.

//! # CIM Result
//!
//! Railway-style outcomes, an in-process mediator and DDD base types.
//!
//! This crate provides three building blocks:
//! - **Outcomes**: [`Outcome<T>`] is a `Result` whose failure is a structured
//!   [`Error`] (message, code, path and nested details), with combinators in
//!   [`OutcomeExt`] and [`OutcomeFutureExt`] and validation chains that collect
//!   every failed rule.
//! - **Mediator**: routes each [`Request`] to its one [`RequestHandler`] through
//!   an ordered pipeline of behaviors, and fans [`Notification`]s out to every
//!   handler registered for them.
//! - **Domain base types**: [`Entity`] identity equality and [`ValueObject`]
//!   structural equality, with an explicit [`TypeResolver`] for proxy types.
//!
//! ## Design Principles
//!
//! 1. **Failures are values**: expected business failures travel as
//!    [`Outcome`]s; misconfiguration surfaces as [`MediatorError`]; defects panic
//! 2. **No hidden state**: type resolution and configuration are passed in
//! 3. **Explicit pipelines**: behaviors run in registration order, global first
//!
//! ## Example
//!
//! ```rust
//! use cim_result::{handler_fn, Command, Error, Mediator, OutcomeExt, Request};
//!
//! struct Deposit { account: String, amount: u64 }
//!
//! impl Request for Deposit {
//!     type Output = u64;
//! }
//!
//! impl Command for Deposit {}
//!
//! # tokio_test::block_on(async {
//! let mediator = Mediator::builder()
//!     .handler(handler_fn(|cmd: Deposit, _ctx| async move {
//!         Ok::<_, Error>(cmd)
//!             .validate()
//!             .rule(|c: &Deposit| c.amount > 0, "amount must be positive")
//!             .rule(|c: &Deposit| !c.account.is_empty(), "account is required")
//!             .validate()
//!             .map(|c| c.amount)
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let rejected = mediator.execute(Deposit { account: String::new(), amount: 0 })
//!     .await
//!     .unwrap();
//! assert_eq!(rejected.unwrap_err().details().len(), 2);
//! # });
//! ```

#![warn(missing_docs)]

mod behaviors;
mod config;
mod cqrs;
mod entity;
mod errors;
mod handlers;
mod mediator;
mod outcome;
mod outcome_async;
mod pipeline;
mod registry;
mod type_resolution;
mod validation;
mod value_object;

pub use behaviors::{LoggingBehavior, Validate, ValidationBehavior};
pub use config::MediatorConfig;
pub use cqrs::{
    CancellationToken, CausationId, Command, CorrelationId, DispatchContext, DispatchId,
    Notification, Query, Request,
};
pub use entity::{
    DomainEvents, Entity, EntityComparer, EntityId, HasDomainEvents, Identifier,
};
pub use errors::{
    Error, Flatten, MediatorError, MediatorResult, VALIDATION_CODE, VALIDATION_MESSAGE,
};
pub use handlers::{handler_fn, FnHandler, NotificationHandler, RequestHandler};
pub use mediator::{Mediator, MediatorBuilder};
pub use outcome::{combine, fail, fail_with, from_option, success, IntoOutcome, Outcome, OutcomeExt};
pub use outcome_async::OutcomeFutureExt;
pub use pipeline::{Behavior, ErasedNext, ErasedReply, ErasedRequest, GlobalBehavior, Next};
pub use registry::{
    BehaviorProvider, GlobalBehaviorProvider, HandlerProvider, NotificationHandlerProvider,
    Provider, ServiceRegistry, Singleton, Transient,
};
pub use type_resolution::{IdentityResolver, ProxySuffixResolver, TypeResolver};
pub use validation::{AsyncValidator, Rule, Validator};
pub use value_object::{Component, ValueObject};
