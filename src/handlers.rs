// Copyright 2025 Cowboy AI, LLC.

//! Request and notification handlers
//!
//! A handler maps one request type to an [`Outcome`]. Expected failures are
//! returned as values; a panic inside a handler is a defect and travels up
//! through the pipeline untouched.

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

use crate::cqrs::{DispatchContext, Notification, Request};
use crate::outcome::Outcome;

/// Handles exactly one request type
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use cim_result::{DispatchContext, Outcome, Request, RequestHandler};
///
/// struct GetStock { sku: String }
///
/// impl Request for GetStock {
///     type Output = u32;
/// }
///
/// struct StockHandler;
///
/// #[async_trait]
/// impl RequestHandler<GetStock> for StockHandler {
///     async fn handle(&self, request: GetStock, _ctx: &DispatchContext) -> Outcome<u32> {
///         Ok(request.sku.len() as u32)
///     }
/// }
/// ```
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    /// Handle the request
    async fn handle(&self, request: R, ctx: &DispatchContext) -> Outcome<R::Output>;
}

/// Handles one notification type; many may be registered
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync {
    /// Handle the notification
    async fn handle(&self, notification: &N, ctx: &DispatchContext) -> Outcome;
}

/// A request handler backed by a closure
pub struct FnHandler<R, F> {
    f: F,
    _request: PhantomData<fn(R)>,
}

/// Adapt an async closure into a [`RequestHandler`]
///
/// The closure receives the request and an owned copy of the context.
pub fn handler_fn<R, F, Fut>(f: F) -> FnHandler<R, F>
where
    R: Request,
    F: Fn(R, DispatchContext) -> Fut + Send + Sync,
    Fut: Future<Output = Outcome<R::Output>> + Send,
{
    FnHandler {
        f,
        _request: PhantomData,
    }
}

#[async_trait]
impl<R, F, Fut> RequestHandler<R> for FnHandler<R, F>
where
    R: Request,
    F: Fn(R, DispatchContext) -> Fut + Send + Sync,
    Fut: Future<Output = Outcome<R::Output>> + Send,
{
    async fn handle(&self, request: R, ctx: &DispatchContext) -> Outcome<R::Output> {
        (self.f)(request, ctx.clone()).await
    }
}
