// Copyright 2025 Cowboy AI, LLC.

//! # In-process mediator
//!
//! Routes each request to its single handler through a pipeline of behaviors,
//! and fans notifications out to every handler registered for them.
//!
//! ## Dispatch
//!
//! ```mermaid
//! graph LR
//!     S[send] --> P{plan cached?}
//!     P -->|no| R[resolve from registry]
//!     R --> C[cache plan]
//!     P -->|yes| I[instantiate providers]
//!     C --> I
//!     I --> G[global behaviors]
//!     G --> B[request behaviors]
//!     B --> H[handler]
//! ```
//!
//! ## Two kinds of failure
//!
//! - A failed [`Outcome`] is an expected business failure and is returned as a
//!   value, whether it came from the handler or a behavior that short-circuited.
//! - A [`MediatorError`] means the mediator itself is misconfigured, e.g. no
//!   handler is registered for the request type.
//!
//! Panics raised by handlers or behaviors are not caught.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, debug_span, warn, Instrument, Span};

use crate::config::MediatorConfig;
use crate::cqrs::{Command, DispatchContext, Notification, Query, Request};
use crate::entity::HasDomainEvents;
use crate::errors::{Error, MediatorError, MediatorResult};
use crate::handlers::{NotificationHandler, RequestHandler};
use crate::outcome::{combine, Outcome};
use crate::pipeline::{compose, Behavior, GlobalAdapter, GlobalBehavior};
use crate::registry::{
    BehaviorProvider, GlobalBehaviorProvider, HandlerProvider, ServiceRegistry, Singleton,
    Transient,
};

/// Everything needed to run one request type, resolved once
struct Plan<R: Request> {
    handler: HandlerProvider<R>,
    global: Vec<GlobalBehaviorProvider>,
    specific: Vec<BehaviorProvider<R>>,
}

impl<R: Request> Plan<R> {
    fn resolve(registry: &ServiceRegistry) -> MediatorResult<Self> {
        let handler = registry
            .handler::<R>()
            .ok_or(MediatorError::HandlerNotRegistered {
                request: type_name::<R>(),
            })?;
        Ok(Self {
            handler,
            global: registry.global_behaviors().to_vec(),
            specific: registry.behaviors::<R>(),
        })
    }

    /// Instantiate the behaviors, global first, each in registration order
    fn behaviors(&self) -> MediatorResult<Vec<Arc<dyn Behavior<R>>>> {
        let mut behaviors: Vec<Arc<dyn Behavior<R>>> =
            Vec::with_capacity(self.global.len() + self.specific.len());
        for provider in &self.global {
            behaviors.push(Arc::new(GlobalAdapter::new(provider.provide()?)));
        }
        for provider in &self.specific {
            behaviors.push(provider.provide()?);
        }
        Ok(behaviors)
    }
}

type PlanCache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

struct Inner {
    registry: ServiceRegistry,
    config: MediatorConfig,
    plans: PlanCache,
}

/// Dispatches requests and publishes notifications
///
/// Cloning is cheap; clones share registrations and the plan cache.
///
/// # Examples
///
/// ```rust
/// use cim_result::{handler_fn, Error, Mediator, Query, Request};
///
/// struct CountVowels(String);
///
/// impl Request for CountVowels {
///     type Output = usize;
/// }
///
/// impl Query for CountVowels {}
///
/// # tokio_test::block_on(async {
/// let mediator = Mediator::builder()
///     .handler(handler_fn(|q: CountVowels, _ctx| async move {
///         if q.0.is_empty() {
///             return Err(Error::new("nothing to count"));
///         }
///         Ok(q.0.chars().filter(|c| "aeiou".contains(*c)).count())
///     }))
///     .build()
///     .unwrap();
///
/// assert_eq!(mediator.query(CountVowels("mediator".into())).await.unwrap(), Ok(4));
/// assert!(mediator.query(CountVowels(String::new())).await.unwrap().is_err());
/// # });
/// ```
#[derive(Clone)]
pub struct Mediator {
    inner: Arc<Inner>,
}

impl Mediator {
    /// Start configuring a mediator
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    /// Dispatch with a fresh root context
    pub async fn send<R: Request>(&self, request: R) -> MediatorResult<Outcome<R::Output>> {
        self.send_with(request, &DispatchContext::new()).await
    }

    /// Dispatch with a caller-provided context
    pub async fn send_with<R: Request>(
        &self,
        request: R,
        ctx: &DispatchContext,
    ) -> MediatorResult<Outcome<R::Output>> {
        let span = if self.inner.config.trace_dispatch {
            debug_span!(
                "mediator.send",
                request = type_name::<R>(),
                dispatch_id = %ctx.dispatch_id(),
                correlation_id = %ctx.correlation_id().0,
            )
        } else {
            Span::none()
        };
        self.dispatch(request, ctx).instrument(span).await
    }

    /// Dispatch a command
    pub async fn execute<C: Command>(&self, command: C) -> MediatorResult<Outcome<C::Output>> {
        self.send(command).await
    }

    /// Dispatch a query
    pub async fn query<Q: Query>(&self, query: Q) -> MediatorResult<Outcome<Q::Output>> {
        self.send(query).await
    }

    async fn dispatch<R: Request>(
        &self,
        request: R,
        ctx: &DispatchContext,
    ) -> MediatorResult<Outcome<R::Output>> {
        let plan = self.plan::<R>().await?;
        let handler = plan.handler.provide()?;
        let behaviors = plan.behaviors()?;

        let started = Instant::now();
        let outcome = compose(&behaviors, handler.as_ref(), ctx).run(request).await;
        let elapsed = started.elapsed();

        if self.inner.config.trace_dispatch {
            match &outcome {
                Ok(_) => debug!(elapsed_us = elapsed.as_micros() as u64, "dispatch succeeded"),
                Err(error) => debug!(
                    elapsed_us = elapsed.as_micros() as u64,
                    code = error.code().unwrap_or_default(),
                    "dispatch failed: {}",
                    error
                ),
            }
        }
        if let Some(threshold) = self.inner.config.slow_dispatch_threshold() {
            if elapsed > threshold {
                warn!(
                    request = type_name::<R>(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "slow dispatch"
                );
            }
        }

        Ok(outcome)
    }

    async fn plan<R: Request>(&self) -> MediatorResult<Arc<Plan<R>>> {
        let key = TypeId::of::<R>();
        let caching = self.inner.config.cache_plans;

        if caching {
            let cached = self.inner.plans.read().await.get(&key).cloned();
            if let Some(plan) = cached.and_then(|plan| plan.downcast::<Plan<R>>().ok()) {
                debug!("plan cache hit for {}", type_name::<R>());
                return Ok(plan);
            }
        }

        let plan = Arc::new(Plan::<R>::resolve(&self.inner.registry)?);
        if caching {
            debug!("plan cache miss for {}", type_name::<R>());
            // A concurrent miss may have stored an equivalent plan first; keep it.
            self.inner
                .plans
                .write()
                .await
                .entry(key)
                .or_insert_with(|| plan.clone() as Arc<dyn Any + Send + Sync>);
        }
        Ok(plan)
    }

    /// Deliver `notification` to every registered handler with a fresh context
    pub async fn publish<N: Notification>(&self, notification: N) -> MediatorResult<Outcome> {
        self.publish_with(&notification, &DispatchContext::new()).await
    }

    /// Deliver `notification` to every registered handler, in registration order
    ///
    /// Handler failures are combined into one outcome. Unless
    /// `publish_continue_on_failure` is set, delivery stops at the first failure.
    pub async fn publish_with<N: Notification>(
        &self,
        notification: &N,
        ctx: &DispatchContext,
    ) -> MediatorResult<Outcome> {
        let providers = self.inner.registry.notification_handlers::<N>();
        if providers.is_empty() {
            debug!("no handlers for notification {}", type_name::<N>());
            return Ok(Ok(()));
        }

        let mut failures: Vec<Error> = Vec::new();
        for provider in providers {
            let handler = provider.provide()?;
            if let Err(error) = handler.handle(notification, ctx).await {
                warn!(
                    notification = type_name::<N>(),
                    dispatch_id = %ctx.dispatch_id(),
                    "notification handler failed: {}",
                    error
                );
                failures.push(error);
                if !self.inner.config.publish_continue_on_failure {
                    break;
                }
            }
        }

        Ok(combine(failures.into_iter().map(Err::<(), _>)).map(|_| ()))
    }

    /// Drain the entity's pending events and publish each one
    ///
    /// Events are removed before delivery, so a second call publishes nothing.
    /// Each event gets its own root context.
    pub async fn publish_domain_events<E>(&self, entity: &mut E) -> MediatorResult<Outcome>
    where
        E: HasDomainEvents,
        E::Event: Notification,
    {
        let events = entity.take_domain_events();
        debug!(
            "publishing {} domain events of type {}",
            events.len(),
            type_name::<E::Event>()
        );

        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.publish(event).await?);
        }
        Ok(combine(outcomes).map(|_| ()))
    }

    /// Whether a handler is registered for `R`
    pub fn is_registered<R: Request>(&self) -> bool {
        self.inner.registry.contains_handler::<R>()
    }

    /// Number of request types with a cached plan
    pub async fn cached_plans(&self) -> usize {
        self.inner.plans.read().await.len()
    }

    /// The active configuration
    pub fn config(&self) -> &MediatorConfig {
        &self.inner.config
    }

    /// The registrations
    pub fn registry(&self) -> &ServiceRegistry {
        &self.inner.registry
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("registry", &self.inner.registry)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Collects registrations for a [`Mediator`]
///
/// Registration errors are held until [`build`](MediatorBuilder::build).
#[derive(Debug, Default)]
pub struct MediatorBuilder {
    registry: ServiceRegistry,
    config: MediatorConfig,
    errors: Vec<MediatorError>,
}

impl MediatorBuilder {
    /// An empty builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    fn record(mut self, result: MediatorResult<()>) -> Self {
        if let Err(error) = result {
            self.errors.push(error);
        }
        self
    }

    /// Register a shared handler for `R`
    pub fn handler<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        let result = self
            .registry
            .register_handler::<R>(Arc::new(Singleton::new(handler)));
        self.record(result)
    }

    /// Register a handler for `R` built on every dispatch
    pub fn handler_factory<R, H, F, E>(mut self, factory: F) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
        F: Fn() -> Result<H, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let provider = Transient::<dyn RequestHandler<R>>::new(move || {
            factory().map(|handler| Arc::new(handler) as Arc<dyn RequestHandler<R>>)
        });
        let result = self.registry.register_handler::<R>(Arc::new(provider));
        self.record(result)
    }

    /// Append a shared behavior for `R`
    pub fn behavior<R, B>(mut self, behavior: B) -> Self
    where
        R: Request,
        B: Behavior<R> + 'static,
    {
        let behavior: Arc<dyn Behavior<R>> = Arc::new(behavior);
        self.registry
            .register_behavior::<R>(Arc::new(Singleton::new(behavior)));
        self
    }

    /// Append a behavior for `R` built on every dispatch
    pub fn behavior_factory<R, B, F, E>(mut self, factory: F) -> Self
    where
        R: Request,
        B: Behavior<R> + 'static,
        F: Fn() -> Result<B, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let provider = Transient::<dyn Behavior<R>>::new(move || {
            factory().map(|behavior| Arc::new(behavior) as Arc<dyn Behavior<R>>)
        });
        self.registry.register_behavior::<R>(Arc::new(provider));
        self
    }

    /// Append a shared behavior for every request
    pub fn global_behavior<G: GlobalBehavior + 'static>(mut self, behavior: G) -> Self {
        let behavior: Arc<dyn GlobalBehavior> = Arc::new(behavior);
        self.registry
            .register_global_behavior(Arc::new(Singleton::new(behavior)));
        self
    }

    /// Append a shared handler for notification `N`
    pub fn notification_handler<N, H>(mut self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let handler: Arc<dyn NotificationHandler<N>> = Arc::new(handler);
        self.registry
            .register_notification_handler::<N>(Arc::new(Singleton::new(handler)));
        self
    }

    /// Replace the configuration
    pub fn config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate and build
    ///
    /// Fails with the first registration error, or an invalid configuration.
    pub fn build(self) -> MediatorResult<Mediator> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        self.config.validate()?;
        debug!(
            handlers = self.registry.registered_requests().count(),
            global_behaviors = self.registry.global_behaviors().len(),
            "mediator built"
        );
        Ok(Mediator {
            inner: Arc::new(Inner {
                registry: self.registry,
                config: self.config,
                plans: RwLock::new(HashMap::new()),
            }),
        })
    }
}
