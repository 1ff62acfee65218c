// Copyright 2025 Cowboy AI, LLC.

//! Service registry for handlers and behaviors
//!
//! A minimal service locator: the mediator asks it for the handler of a request
//! type, the behaviors that apply to it, and the handlers of a notification
//! type. Each entry is a [`Provider`] so registrations can be shared instances
//! or factories.

use indexmap::IndexMap;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::cqrs::{Notification, Request};
use crate::errors::{MediatorError, MediatorResult};
use crate::handlers::{NotificationHandler, RequestHandler};
use crate::pipeline::{Behavior, GlobalBehavior};

/// Produces instances of a service
pub trait Provider<T: ?Sized>: Send + Sync {
    /// Resolve an instance
    fn provide(&self) -> MediatorResult<Arc<T>>;
}

/// One instance shared by every resolution
pub struct Singleton<T: ?Sized> {
    instance: Arc<T>,
}

impl<T: ?Sized> Singleton<T> {
    /// Wrap a shared instance
    pub fn new(instance: Arc<T>) -> Self {
        Self { instance }
    }
}

impl<T: ?Sized + Send + Sync> Provider<T> for Singleton<T> {
    fn provide(&self) -> MediatorResult<Arc<T>> {
        Ok(self.instance.clone())
    }
}

impl<T: ?Sized> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Singleton")
            .field("service", &type_name::<T>())
            .finish()
    }
}

type Factory<T> = Box<dyn Fn() -> MediatorResult<Arc<T>> + Send + Sync>;

/// A fresh instance per resolution
pub struct Transient<T: ?Sized> {
    factory: Factory<T>,
}

impl<T: ?Sized + 'static> Transient<T> {
    /// Resolve through `factory`; its errors become [`MediatorError::ResolutionFailed`]
    pub fn new<F, E>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<T>, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            factory: Box::new(move || {
                factory().map_err(|e| MediatorError::ResolutionFailed {
                    service: type_name::<T>(),
                    reason: e.to_string(),
                })
            }),
        }
    }
}

impl<T: ?Sized + Send + Sync> Provider<T> for Transient<T> {
    fn provide(&self) -> MediatorResult<Arc<T>> {
        (self.factory)()
    }
}

impl<T: ?Sized> fmt::Debug for Transient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transient")
            .field("service", &type_name::<T>())
            .finish_non_exhaustive()
    }
}

/// Provider of the handler for `R`
pub type HandlerProvider<R> = Arc<dyn Provider<dyn RequestHandler<R>>>;
/// Provider of a behavior specific to `R`
pub type BehaviorProvider<R> = Arc<dyn Provider<dyn Behavior<R>>>;
/// Provider of a behavior for every request
pub type GlobalBehaviorProvider = Arc<dyn Provider<dyn GlobalBehavior>>;
/// Provider of one handler for notification `N`
pub type NotificationHandlerProvider<N> = Arc<dyn Provider<dyn NotificationHandler<N>>>;

struct Entry {
    type_name: &'static str,
    providers: Box<dyn Any + Send + Sync>,
}

impl Entry {
    fn new<T: Any + Send + Sync>(type_name: &'static str, providers: T) -> Self {
        Self {
            type_name,
            providers: Box::new(providers),
        }
    }
}

/// Registrations keyed by message type
///
/// Handlers are unique per request type. Behaviors and notification handlers
/// keep their registration order.
#[derive(Default)]
pub struct ServiceRegistry {
    handlers: IndexMap<TypeId, Entry>,
    behaviors: IndexMap<TypeId, Entry>,
    global_behaviors: Vec<GlobalBehaviorProvider>,
    notification_handlers: IndexMap<TypeId, Entry>,
}

impl ServiceRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `R`
    pub fn register_handler<R: Request>(&mut self, provider: HandlerProvider<R>) -> MediatorResult<()> {
        let key = TypeId::of::<R>();
        if self.handlers.contains_key(&key) {
            return Err(MediatorError::DuplicateHandler {
                request: type_name::<R>(),
            });
        }
        self.handlers.insert(key, Entry::new(type_name::<R>(), provider));
        Ok(())
    }

    /// Append a behavior for `R`
    pub fn register_behavior<R: Request>(&mut self, provider: BehaviorProvider<R>) {
        let entry = self
            .behaviors
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Entry::new(type_name::<R>(), Vec::<BehaviorProvider<R>>::new()));
        if let Some(list) = entry.providers.downcast_mut::<Vec<BehaviorProvider<R>>>() {
            list.push(provider);
        }
    }

    /// Append a behavior for every request
    pub fn register_global_behavior(&mut self, provider: GlobalBehaviorProvider) {
        self.global_behaviors.push(provider);
    }

    /// Append a handler for notification `N`
    pub fn register_notification_handler<N: Notification>(
        &mut self,
        provider: NotificationHandlerProvider<N>,
    ) {
        let entry = self
            .notification_handlers
            .entry(TypeId::of::<N>())
            .or_insert_with(|| {
                Entry::new(type_name::<N>(), Vec::<NotificationHandlerProvider<N>>::new())
            });
        if let Some(list) = entry
            .providers
            .downcast_mut::<Vec<NotificationHandlerProvider<N>>>()
        {
            list.push(provider);
        }
    }

    /// The handler provider for `R`
    pub fn handler<R: Request>(&self) -> Option<HandlerProvider<R>> {
        self.handlers
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.providers.downcast_ref::<HandlerProvider<R>>())
            .cloned()
    }

    /// Behavior providers for `R`, in registration order
    pub fn behaviors<R: Request>(&self) -> Vec<BehaviorProvider<R>> {
        self.behaviors
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.providers.downcast_ref::<Vec<BehaviorProvider<R>>>())
            .cloned()
            .unwrap_or_default()
    }

    /// Global behavior providers, in registration order
    pub fn global_behaviors(&self) -> &[GlobalBehaviorProvider] {
        &self.global_behaviors
    }

    /// Handler providers for `N`, in registration order
    pub fn notification_handlers<N: Notification>(&self) -> Vec<NotificationHandlerProvider<N>> {
        self.notification_handlers
            .get(&TypeId::of::<N>())
            .and_then(|entry| {
                entry
                    .providers
                    .downcast_ref::<Vec<NotificationHandlerProvider<N>>>()
            })
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `R` has a handler
    pub fn contains_handler<R: Request>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<R>())
    }

    /// Request type names with a handler, in registration order
    pub fn registered_requests(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.values().map(|entry| entry.type_name)
    }

    /// Notification type names with at least one handler
    pub fn registered_notifications(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.notification_handlers.values().map(|entry| entry.type_name)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("handlers", &self.registered_requests().collect::<Vec<_>>())
            .field(
                "behaviors",
                &self.behaviors.values().map(|e| e.type_name).collect::<Vec<_>>(),
            )
            .field("global_behaviors", &self.global_behaviors.len())
            .field(
                "notifications",
                &self.registered_notifications().collect::<Vec<_>>(),
            )
            .finish()
    }
}
