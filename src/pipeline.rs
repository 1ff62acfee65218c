// Copyright 2025 Cowboy AI, LLC.

//! Pipeline behaviors and their composition
//!
//! A behavior wraps the handler call. It receives the request, the dispatch
//! context and a [`Next`] continuation, and may:
//! - inspect or change the request before calling `next`,
//! - return its own outcome without calling `next` (short-circuit),
//! - call `next` and post-process what comes back.
//!
//! Request-specific behaviors implement [`Behavior<R>`]. Behaviors that apply to
//! every request implement [`GlobalBehavior`] and see the request through an
//! [`ErasedRequest`].
//!
//! The chain is composed right-to-left once per dispatch: the handler call is
//! the innermost step and the first registered behavior the outermost.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::cqrs::{DispatchContext, Request};
use crate::handlers::RequestHandler;
use crate::outcome::Outcome;

type NextFn<'a, R> =
    Box<dyn FnOnce(R) -> BoxFuture<'a, Outcome<<R as Request>::Output>> + Send + 'a>;

/// The rest of the pipeline, as seen from a behavior
///
/// Consumed by [`run`](Next::run); a behavior that drops it without running
/// short-circuits everything after it, handler included.
pub struct Next<'a, R: Request> {
    inner: NextFn<'a, R>,
}

impl<'a, R: Request> Next<'a, R> {
    /// Continue down the pipeline
    pub async fn run(self, request: R) -> Outcome<R::Output> {
        (self.inner)(request).await
    }
}

impl<R: Request> fmt::Debug for Next<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("request", &type_name::<R>())
            .finish()
    }
}

/// Middleware for one request type
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use cim_result::{Behavior, DispatchContext, Error, Next, Outcome, Request};
///
/// struct Withdraw { amount: u64 }
///
/// impl Request for Withdraw {
///     type Output = u64;
/// }
///
/// struct DailyLimit(u64);
///
/// #[async_trait]
/// impl Behavior<Withdraw> for DailyLimit {
///     async fn handle(
///         &self,
///         request: Withdraw,
///         _ctx: &DispatchContext,
///         next: Next<'_, Withdraw>,
///     ) -> Outcome<u64> {
///         if request.amount > self.0 {
///             return Err(Error::new("daily limit exceeded").with_code("LIMIT"));
///         }
///         next.run(request).await
///     }
/// }
/// ```
#[async_trait]
pub trait Behavior<R: Request>: Send + Sync {
    /// Run this step of the pipeline
    async fn handle(&self, request: R, ctx: &DispatchContext, next: Next<'_, R>)
        -> Outcome<R::Output>;
}

/// A request with its type erased, as seen by a [`GlobalBehavior`]
///
/// The payload can be inspected and modified in place but not replaced.
/// Handing a request kept from one dispatch to the `next` of a dispatch for a
/// different request type panics.
pub struct ErasedRequest {
    type_name: &'static str,
    payload: Box<dyn Any + Send>,
}

impl ErasedRequest {
    fn new<R: Request>(request: R) -> Self {
        Self {
            type_name: type_name::<R>(),
            payload: Box::new(request),
        }
    }

    fn into_inner<R: Request>(self) -> R {
        match self.payload.downcast::<R>() {
            Ok(request) => *request,
            Err(_) => panic!(
                "erased request of type {} passed to the pipeline of {}",
                self.type_name,
                type_name::<R>()
            ),
        }
    }

    /// Type name of the request
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the request is an `R`
    pub fn is<R: Request>(&self) -> bool {
        self.payload.is::<R>()
    }

    /// The request, if it is an `R`
    pub fn downcast_ref<R: Request>(&self) -> Option<&R> {
        self.payload.downcast_ref::<R>()
    }

    /// The request mutably, if it is an `R`
    pub fn downcast_mut<R: Request>(&mut self) -> Option<&mut R> {
        self.payload.downcast_mut::<R>()
    }
}

impl fmt::Debug for ErasedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedRequest")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A successful handler output with its type erased
///
/// Only the pipeline produces replies, so a global behavior can succeed only
/// by passing on what `next` returned. A reply kept from an earlier dispatch
/// may be returned again for the same request type.
///
/// # Panics
///
/// The dispatch panics when a global behavior returns a reply whose output
/// type differs from the one the current request expects.
pub struct ErasedReply {
    type_name: &'static str,
    payload: Box<dyn Any + Send>,
}

impl ErasedReply {
    fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            payload: Box::new(value),
        }
    }

    fn into_inner<T: Send + 'static>(self) -> T {
        match self.payload.downcast::<T>() {
            Ok(value) => *value,
            Err(_) => panic!(
                "erased reply of type {} returned for a request expecting {}",
                self.type_name,
                type_name::<T>()
            ),
        }
    }

    /// Type name of the output
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The output, if it is a `T`
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// The output mutably, if it is a `T`
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.payload.downcast_mut::<T>()
    }
}

impl fmt::Debug for ErasedReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedReply")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

type ErasedNextFn<'a> =
    Box<dyn FnOnce(ErasedRequest) -> BoxFuture<'a, Outcome<ErasedReply>> + Send + 'a>;

/// The rest of the pipeline, as seen from a [`GlobalBehavior`]
pub struct ErasedNext<'a> {
    inner: ErasedNextFn<'a>,
}

impl<'a> ErasedNext<'a> {
    /// Continue down the pipeline
    pub async fn run(self, request: ErasedRequest) -> Outcome<ErasedReply> {
        (self.inner)(request).await
    }
}

impl fmt::Debug for ErasedNext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedNext").finish_non_exhaustive()
    }
}

/// Middleware applied to every request type
///
/// # Panics
///
/// A successful return must carry a reply for the request being dispatched,
/// normally the one `next` produced. Returning a reply of another output type
/// panics the dispatch, as does passing a request of another type to `next`.
#[async_trait]
pub trait GlobalBehavior: Send + Sync {
    /// Run this step of the pipeline
    async fn handle(
        &self,
        request: ErasedRequest,
        ctx: &DispatchContext,
        next: ErasedNext<'_>,
    ) -> Outcome<ErasedReply>;
}

/// Presents a global behavior as a typed one
pub(crate) struct GlobalAdapter {
    inner: Arc<dyn GlobalBehavior>,
}

impl GlobalAdapter {
    pub(crate) fn new(inner: Arc<dyn GlobalBehavior>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: Request> Behavior<R> for GlobalAdapter {
    async fn handle(
        &self,
        request: R,
        ctx: &DispatchContext,
        next: Next<'_, R>,
    ) -> Outcome<R::Output> {
        let erased_next = ErasedNext {
            inner: Box::new(move |erased: ErasedRequest| {
                async move {
                    next.run(erased.into_inner::<R>())
                        .await
                        .map(ErasedReply::new)
                }
                .boxed()
            }),
        };

        let reply = self
            .inner
            .handle(ErasedRequest::new(request), ctx, erased_next)
            .await?;
        Ok(reply.into_inner::<R::Output>())
    }
}

/// Fold `behaviors` around `handler`, last behavior innermost
///
/// Returns the entry point of the chain; running it runs the first behavior.
pub(crate) fn compose<'a, R: Request>(
    behaviors: &'a [Arc<dyn Behavior<R>>],
    handler: &'a dyn RequestHandler<R>,
    ctx: &'a DispatchContext,
) -> Next<'a, R> {
    let mut next: NextFn<'a, R> = Box::new(move |request: R| handler.handle(request, ctx));
    for behavior in behaviors.iter().rev() {
        let inner = Next { inner: next };
        next = Box::new(move |request: R| behavior.handle(request, ctx, inner));
    }
    Next { inner: next }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::handlers::handler_fn;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct Greet(String);

    impl Request for Greet {
        type Output = String;
    }

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Behavior<Greet> for Recorder {
        async fn handle(
            &self,
            request: Greet,
            _ctx: &DispatchContext,
            next: Next<'_, Greet>,
        ) -> Outcome<String> {
            self.log.lock().unwrap().push(format!("{} before", self.name));
            let result = next.run(request).await;
            self.log.lock().unwrap().push(format!("{} after", self.name));
            result
        }
    }

    struct Shout;

    #[async_trait]
    impl GlobalBehavior for Shout {
        async fn handle(
            &self,
            mut request: ErasedRequest,
            _ctx: &DispatchContext,
            next: ErasedNext<'_>,
        ) -> Outcome<ErasedReply> {
            if let Some(greet) = request.downcast_mut::<Greet>() {
                greet.0 = greet.0.to_uppercase();
            }
            let mut reply = next.run(request).await?;
            if let Some(text) = reply.downcast_mut::<String>() {
                text.push('!');
            }
            Ok(reply)
        }
    }

    struct Deny;

    #[async_trait]
    impl GlobalBehavior for Deny {
        async fn handle(
            &self,
            request: ErasedRequest,
            _ctx: &DispatchContext,
            _next: ErasedNext<'_>,
        ) -> Outcome<ErasedReply> {
            Err(Error::new(format!("{} denied", request.type_name())).with_code("DENIED"))
        }
    }

    /// Answers from a stored reply without calling `next`
    struct Replay {
        stored: Mutex<Option<ErasedReply>>,
    }

    impl Replay {
        fn with<T: Send + 'static>(value: T) -> Self {
            Self { stored: Mutex::new(Some(ErasedReply::new(value))) }
        }
    }

    #[async_trait]
    impl GlobalBehavior for Replay {
        async fn handle(
            &self,
            request: ErasedRequest,
            _ctx: &DispatchContext,
            next: ErasedNext<'_>,
        ) -> Outcome<ErasedReply> {
            let stored = self.stored.lock().unwrap().take();
            match stored {
                Some(reply) => Ok(reply),
                None => next.run(request).await,
            }
        }
    }

    /// Test behaviors wrap the handler in order
    ///
    /// ```mermaid
    /// sequenceDiagram
    ///     A->>B: next
    ///     B->>H: next
    ///     H-->>B: outcome
    ///     B-->>A: outcome
    /// ```
    #[tokio::test]
    async fn test_compose_runs_outermost_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let behaviors: Vec<Arc<dyn Behavior<Greet>>> = vec![
            Arc::new(Recorder { name: "a", log: log.clone() }),
            Arc::new(Recorder { name: "b", log: log.clone() }),
        ];
        let handler_log = log.clone();
        let handler = handler_fn(move |request: Greet, _ctx| {
            let handler_log = handler_log.clone();
            async move {
                handler_log.lock().unwrap().push("handler".to_string());
                Ok::<_, Error>(format!("hello {}", request.0))
            }
        });
        let ctx = DispatchContext::new();

        let outcome = compose(&behaviors, &handler, &ctx)
            .run(Greet("ann".into()))
            .await;

        assert_eq!(outcome, Ok("hello ann".to_string()));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a before", "b before", "handler", "b after", "a after"]
        );
    }

    #[tokio::test]
    async fn test_global_behavior_modifies_request_and_reply() {
        let behaviors: Vec<Arc<dyn Behavior<Greet>>> =
            vec![Arc::new(GlobalAdapter::new(Arc::new(Shout)))];
        let handler =
            handler_fn(|request: Greet, _ctx| async move { Ok::<_, Error>(request.0) });
        let ctx = DispatchContext::new();

        let outcome = compose(&behaviors, &handler, &ctx)
            .run(Greet("quiet".into()))
            .await;

        assert_eq!(outcome, Ok("QUIET!".to_string()));
    }

    #[tokio::test]
    async fn test_global_behavior_short_circuits() {
        let behaviors: Vec<Arc<dyn Behavior<Greet>>> =
            vec![Arc::new(GlobalAdapter::new(Arc::new(Deny)))];
        let handler = handler_fn(|_: Greet, _ctx| async move {
            Err::<String, _>(Error::new("handler ran").with_code("HANDLER"))
        });
        let ctx = DispatchContext::new();

        let outcome = compose(&behaviors, &handler, &ctx)
            .run(Greet("x".into()))
            .await;

        let error = outcome.unwrap_err();
        assert_eq!(error.code(), Some("DENIED"));
        assert!(error.message().ends_with("Greet denied"));
    }

    #[tokio::test]
    async fn test_global_behavior_replays_reply_of_same_type() {
        let behaviors: Vec<Arc<dyn Behavior<Greet>>> = vec![Arc::new(GlobalAdapter::new(
            Arc::new(Replay::with("remembered".to_string())),
        ))];
        let handler =
            handler_fn(|request: Greet, _ctx| async move { Ok::<_, Error>(request.0) });
        let ctx = DispatchContext::new();

        let first = compose(&behaviors, &handler, &ctx).run(Greet("a".into())).await;
        let second = compose(&behaviors, &handler, &ctx).run(Greet("b".into())).await;

        assert_eq!(first, Ok("remembered".to_string()));
        assert_eq!(second, Ok("b".to_string()));
    }

    #[tokio::test]
    #[should_panic(expected = "erased reply of type u32 returned for a request expecting")]
    async fn test_global_behavior_reply_of_other_type_panics() {
        let behaviors: Vec<Arc<dyn Behavior<Greet>>> =
            vec![Arc::new(GlobalAdapter::new(Arc::new(Replay::with(7u32))))];
        let handler =
            handler_fn(|request: Greet, _ctx| async move { Ok::<_, Error>(request.0) });
        let ctx = DispatchContext::new();

        let _ = compose(&behaviors, &handler, &ctx).run(Greet("a".into())).await;
    }
}
