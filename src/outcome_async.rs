// Copyright 2025 Cowboy AI, LLC.

//! Combinators for futures that resolve to an [`Outcome`]
//!
//! These mirror [`OutcomeExt`](crate::OutcomeExt) so a chain can stay fluent
//! across await points:
//!
//! ```rust
//! use cim_result::{Error, Outcome, OutcomeFutureExt};
//!
//! async fn load(id: u32) -> Outcome<u32> {
//!     Ok(id * 10)
//! }
//!
//! # tokio_test::block_on(async {
//! let total = load(4)
//!     .ensure(|v| *v > 0, "empty")
//!     .bind(|v| async move { Ok::<_, Error>(v + 1) })
//!     .map_value(|v| v.to_string())
//!     .await;
//!
//! assert_eq!(total, Ok("41".to_string()));
//! # });
//! ```

use std::future::Future;

use crate::errors::Error;
use crate::outcome::{Outcome, OutcomeExt};

/// Fluent combinators on `Future<Output = Outcome<T>>`
pub trait OutcomeFutureExt<T>: Future<Output = Outcome<T>> + Sized {
    /// Continue with an async step on success
    fn bind<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        Self: Send,
        T: Send,
        F: FnOnce(T) -> Fut + Send,
        Fut: Future<Output = Outcome<U>> + Send,
    {
        async move {
            match self.await {
                Ok(value) => f(value).await,
                Err(error) => Err(error),
            }
        }
    }

    /// Continue with a synchronous step on success
    fn bind_sync<U, F>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        Self: Send,
        F: FnOnce(T) -> Outcome<U> + Send,
    {
        async move { self.await.and_then(f) }
    }

    /// Transform the success value
    fn map_value<U, F>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        Self: Send,
        F: FnOnce(T) -> U + Send,
    {
        async move { self.await.map(f) }
    }

    /// Transform the success value with an async mapper
    fn map_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        Self: Send,
        T: Send,
        F: FnOnce(T) -> Fut + Send,
        Fut: Future<Output = U> + Send,
    {
        async move {
            match self.await {
                Ok(value) => Ok(f(value).await),
                Err(error) => Err(error),
            }
        }
    }

    /// Observe the value without changing the outcome
    fn tap<F>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        F: FnOnce(&T) + Send,
    {
        async move {
            let outcome = self.await;
            if let Ok(value) = &outcome {
                f(value);
            }
            outcome
        }
    }

    /// Observe the error without changing the outcome
    fn tap_error<F>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        F: FnOnce(&Error) + Send,
    {
        async move {
            let outcome = self.await;
            if let Err(error) = &outcome {
                f(error);
            }
            outcome
        }
    }

    /// Replace a failure with a success
    fn recover<F>(self, fallback: F) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        F: FnOnce(Error) -> T + Send,
    {
        async move { Ok(self.await.unwrap_or_else(fallback)) }
    }

    /// Fail with `error` when the value does not satisfy `predicate`
    fn ensure<P, E>(self, predicate: P, error: E) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        P: FnOnce(&T) -> bool + Send,
        E: Into<Error> + Send,
    {
        async move {
            match self.await {
                Ok(value) if !predicate(&value) => Err(error.into()),
                other => other,
            }
        }
    }

    /// Observe the value with an async side effect
    fn tap_async<F, Fut>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        T: Send + Sync,
        F: FnOnce(&T) -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        async move { self.await.tap_async(f).await }
    }

    /// Observe the error with an async side effect
    fn tap_error_async<F, Fut>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        T: Send,
        F: FnOnce(&Error) -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        async move { self.await.tap_error_async(f).await }
    }

    /// Replace a failure with a success produced asynchronously
    fn recover_async<F, Fut>(self, fallback: F) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        T: Send,
        F: FnOnce(Error) -> Fut + Send,
        Fut: Future<Output = T> + Send,
    {
        async move { self.await.recover_async(fallback).await }
    }

    /// Fail with `error` when the async `predicate` rejects the value
    fn ensure_async<P, Fut, E>(
        self,
        predicate: P,
        error: E,
    ) -> impl Future<Output = Outcome<T>> + Send
    where
        Self: Send,
        T: Send,
        P: FnOnce(&T) -> Fut + Send,
        Fut: Future<Output = bool> + Send,
        E: Into<Error> + Send,
    {
        async move { self.await.ensure_async(predicate, error).await }
    }

    /// Reduce both branches to one value
    fn fold<U, S, E>(self, on_success: S, on_failure: E) -> impl Future<Output = U> + Send
    where
        Self: Send,
        S: FnOnce(T) -> U + Send,
        E: FnOnce(Error) -> U + Send,
    {
        async move {
            match self.await {
                Ok(value) => on_success(value),
                Err(error) => on_failure(error),
            }
        }
    }
}

impl<T, F> OutcomeFutureExt<T> for F where F: Future<Output = Outcome<T>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::fail;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    async fn failing() -> Outcome<i32> {
        fail(Error::new("bad").with_code("E1"))
    }

    async fn succeeding() -> Outcome<i32> {
        Ok(3)
    }

    #[tokio::test]
    async fn test_bind_skips_on_failure() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let result = failing()
            .bind(move |v| async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, Error>(v)
            })
            .await;

        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(result, Err(Error::new("bad").with_code("E1")));
    }

    #[tokio::test]
    async fn test_map_skips_on_failure() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let result = failing()
            .map_value(move |v| {
                flag.store(true, Ordering::SeqCst);
                v
            })
            .await;

        assert!(result.is_err());
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_chain_on_success() {
        let result = succeeding()
            .bind_sync(|v| Ok(v * 2))
            .map_async(|v| async move { v + 1 })
            .tap(|v| assert_eq!(*v, 7))
            .fold(|v| v.to_string(), |e| e.message().to_string())
            .await;

        assert_eq!(result, "7");
    }

    #[tokio::test]
    async fn test_recover_and_ensure() {
        assert_eq!(failing().recover(|_| 0).await, Ok(0));

        let guarded = succeeding().ensure(|v| *v > 10, "too small").await;
        assert_eq!(guarded, Err(Error::new("too small")));
    }

    #[tokio::test]
    async fn test_async_callbacks_keep_short_circuit() {
        let effects = std::sync::Mutex::new(Vec::new());

        let result = succeeding()
            .tap_async(|v| {
                let step = format!("ok {v}");
                let effects = &effects;
                async move { effects.lock().unwrap().push(step) }
            })
            .tap_error_async(|_| {
                let effects = &effects;
                async move { effects.lock().unwrap().push("error".to_string()) }
            })
            .ensure_async(
                |v| {
                    let v = *v;
                    async move { v > 10 }
                },
                Error::new("too small").with_code("MIN"),
            )
            .tap_async(|_| {
                let effects = &effects;
                async move { effects.lock().unwrap().push("unreached".to_string()) }
            })
            .tap_error_async(|e| {
                let step = format!("error {}", e.code().unwrap_or_default());
                let effects = &effects;
                async move { effects.lock().unwrap().push(step) }
            })
            .await;

        assert_eq!(result.unwrap_err().code(), Some("MIN"));
        assert_eq!(*effects.lock().unwrap(), vec!["ok 3", "error MIN"]);
    }

    #[tokio::test]
    async fn test_recover_async_runs_only_on_failure() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let kept = succeeding()
            .recover_async(move |_| async move {
                flag.store(true, Ordering::SeqCst);
                0
            })
            .await;
        assert_eq!(kept, Ok(3));
        assert!(!called.load(Ordering::SeqCst));

        let recovered = failing()
            .recover_async(|e| async move { e.message().len() as i32 })
            .await;
        assert_eq!(recovered, Ok(3));
    }
}
