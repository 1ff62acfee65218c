// Copyright 2025 Cowboy AI, LLC.

//! Outcomes: success or an [`Error`] value
//!
//! An [`Outcome<T>`] is a plain `Result<T, Error>`. `Ok` and `map` come from the
//! standard library; [`OutcomeExt`] adds the combinators domain code reaches for
//! when expected failures are values rather than panics.
//!
//! ```rust
//! use cim_result::{fail, Error, Outcome, OutcomeExt};
//!
//! let parsed: Outcome<i32> = fail(Error::new("bad").with_code("E1"));
//! let next = parsed.bind(|x| Ok::<_, Error>(x + 1));
//!
//! assert_eq!(next.error().message(), "bad");
//! assert_eq!(next.error().code(), Some("E1"));
//! ```

use std::fmt::Display;
use std::future::Future;

use crate::errors::Error;
use crate::validation::Validator;

/// Success carrying `T`, or failure carrying one [`Error`]
pub type Outcome<T = ()> = Result<T, Error>;

/// An untyped success
pub fn success() -> Outcome {
    Ok(())
}

/// A failure from anything convertible into an [`Error`]
pub fn fail<T>(error: impl Into<Error>) -> Outcome<T> {
    Err(error.into())
}

/// A failure whose error carries the given details
pub fn fail_with<T>(error: impl Into<Error>, details: impl IntoIterator<Item = Error>) -> Outcome<T> {
    Err(error.into().with_details(details))
}

/// Lift an option, failing with `error` on `None`
pub fn from_option<T>(option: Option<T>, error: impl Into<Error>) -> Outcome<T> {
    option.ok_or_else(|| error.into())
}

/// Collect outcomes; every failure ends up as a detail of one aggregate error
///
/// All inputs are consumed, so the aggregate lists every failure in input order.
pub fn combine<T, I>(outcomes: I) -> Outcome<Vec<T>>
where
    I: IntoIterator<Item = Outcome<T>>,
{
    let mut values = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(value) => values.push(value),
            Err(error) => failures.push(error),
        }
    }

    match failures.len() {
        0 => Ok(values),
        1 => Err(failures.remove(0)),
        _ => Err(Error::aggregate("multiple failures", failures)),
    }
}

/// Combinators for [`Outcome`]
pub trait OutcomeExt<T>: Sized {
    /// The success value
    ///
    /// # Panics
    ///
    /// Panics when called on a failure. Reading the value of a failed outcome
    /// is a programming error, not an expected failure.
    fn value(&self) -> &T;

    /// The failure
    ///
    /// # Panics
    ///
    /// Panics when called on a success.
    fn error(&self) -> &Error;

    /// Continue with `f` on success; a failure passes through untouched
    fn bind<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Outcome<U>;

    /// Reduce both branches to a single value
    fn fold<U, S, E>(self, on_success: S, on_failure: E) -> U
    where
        S: FnOnce(T) -> U,
        E: FnOnce(Error) -> U;

    /// Turn a failure into a success produced by `fallback`
    fn recover<F>(self, fallback: F) -> Outcome<T>
    where
        F: FnOnce(Error) -> T;

    /// Run `f` against the value without changing the outcome
    fn tap<F>(self, f: F) -> Outcome<T>
    where
        F: FnOnce(&T);

    /// Run `f` against the error without changing the outcome
    fn tap_error<F>(self, f: F) -> Outcome<T>
    where
        F: FnOnce(&Error);

    /// Fail with `error` when the value does not satisfy `predicate`
    fn ensure<P>(self, predicate: P, error: impl Into<Error>) -> Outcome<T>
    where
        P: FnOnce(&T) -> bool;

    /// Start a validation chain with this outcome as context
    fn validate<'a>(self) -> Validator<'a, T>;

    /// Drop the value
    fn discard(self) -> Outcome;

    /// [`bind`](OutcomeExt::bind) with an async continuation
    fn bind_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        T: Send,
        F: FnOnce(T) -> Fut + Send,
        Fut: Future<Output = Outcome<U>> + Send;

    /// `map` with an async mapper
    fn map_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        T: Send,
        F: FnOnce(T) -> Fut + Send,
        Fut: Future<Output = U> + Send;

    /// [`tap`](OutcomeExt::tap) with an async side effect
    fn tap_async<F, Fut>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send + Sync,
        F: FnOnce(&T) -> Fut + Send,
        Fut: Future<Output = ()> + Send;

    /// [`recover`](OutcomeExt::recover) with an async fallback
    fn recover_async<F, Fut>(self, fallback: F) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        F: FnOnce(Error) -> Fut + Send,
        Fut: Future<Output = T> + Send;

    /// [`tap_error`](OutcomeExt::tap_error) with an async side effect
    fn tap_error_async<F, Fut>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        F: FnOnce(&Error) -> Fut + Send,
        Fut: Future<Output = ()> + Send;

    /// [`ensure`](OutcomeExt::ensure) with an async predicate
    fn ensure_async<P, Fut, E>(
        self,
        predicate: P,
        error: E,
    ) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        P: FnOnce(&T) -> Fut + Send,
        Fut: Future<Output = bool> + Send,
        E: Into<Error> + Send;

    /// [`fold`](OutcomeExt::fold) with async branches
    fn fold_async<U, S, SFut, E, EFut>(
        self,
        on_success: S,
        on_failure: E,
    ) -> impl Future<Output = U> + Send
    where
        T: Send,
        S: FnOnce(T) -> SFut + Send,
        SFut: Future<Output = U> + Send,
        E: FnOnce(Error) -> EFut + Send,
        EFut: Future<Output = U> + Send;
}

impl<T> OutcomeExt<T> for Outcome<T> {
    fn value(&self) -> &T {
        match self {
            Ok(value) => value,
            Err(error) => panic!("attempted to read the value of a failed outcome: {error}"),
        }
    }

    fn error(&self) -> &Error {
        match self {
            Ok(_) => panic!("attempted to read the error of a successful outcome"),
            Err(error) => error,
        }
    }

    fn bind<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Outcome<U>,
    {
        self.and_then(f)
    }

    fn fold<U, S, E>(self, on_success: S, on_failure: E) -> U
    where
        S: FnOnce(T) -> U,
        E: FnOnce(Error) -> U,
    {
        match self {
            Ok(value) => on_success(value),
            Err(error) => on_failure(error),
        }
    }

    fn recover<F>(self, fallback: F) -> Outcome<T>
    where
        F: FnOnce(Error) -> T,
    {
        Ok(self.unwrap_or_else(fallback))
    }

    fn tap<F>(self, f: F) -> Outcome<T>
    where
        F: FnOnce(&T),
    {
        if let Ok(value) = &self {
            f(value);
        }
        self
    }

    fn tap_error<F>(self, f: F) -> Outcome<T>
    where
        F: FnOnce(&Error),
    {
        if let Err(error) = &self {
            f(error);
        }
        self
    }

    fn ensure<P>(self, predicate: P, error: impl Into<Error>) -> Outcome<T>
    where
        P: FnOnce(&T) -> bool,
    {
        match self {
            Ok(value) if !predicate(&value) => Err(error.into()),
            other => other,
        }
    }

    fn validate<'a>(self) -> Validator<'a, T> {
        Validator::new(self)
    }

    fn discard(self) -> Outcome {
        self.map(|_| ())
    }

    fn bind_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        T: Send,
        F: FnOnce(T) -> Fut + Send,
        Fut: Future<Output = Outcome<U>> + Send,
    {
        async move {
            match self {
                Ok(value) => f(value).await,
                Err(error) => Err(error),
            }
        }
    }

    fn map_async<U, F, Fut>(self, f: F) -> impl Future<Output = Outcome<U>> + Send
    where
        T: Send,
        F: FnOnce(T) -> Fut + Send,
        Fut: Future<Output = U> + Send,
    {
        async move {
            match self {
                Ok(value) => Ok(f(value).await),
                Err(error) => Err(error),
            }
        }
    }

    fn tap_async<F, Fut>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send + Sync,
        F: FnOnce(&T) -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        async move {
            if let Ok(value) = &self {
                f(value).await;
            }
            self
        }
    }

    fn recover_async<F, Fut>(self, fallback: F) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        F: FnOnce(Error) -> Fut + Send,
        Fut: Future<Output = T> + Send,
    {
        async move {
            match self {
                Ok(value) => Ok(value),
                Err(error) => Ok(fallback(error).await),
            }
        }
    }

    fn tap_error_async<F, Fut>(self, f: F) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        F: FnOnce(&Error) -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        async move {
            let effect = self.as_ref().err().map(f);
            if let Some(effect) = effect {
                effect.await;
            }
            self
        }
    }

    fn ensure_async<P, Fut, E>(
        self,
        predicate: P,
        error: E,
    ) -> impl Future<Output = Outcome<T>> + Send
    where
        T: Send,
        P: FnOnce(&T) -> Fut + Send,
        Fut: Future<Output = bool> + Send,
        E: Into<Error> + Send,
    {
        async move {
            match self {
                Ok(value) => {
                    let check = predicate(&value);
                    if check.await {
                        Ok(value)
                    } else {
                        Err(error.into())
                    }
                }
                Err(failure) => Err(failure),
            }
        }
    }

    fn fold_async<U, S, SFut, E, EFut>(
        self,
        on_success: S,
        on_failure: E,
    ) -> impl Future<Output = U> + Send
    where
        T: Send,
        S: FnOnce(T) -> SFut + Send,
        SFut: Future<Output = U> + Send,
        E: FnOnce(Error) -> EFut + Send,
        EFut: Future<Output = U> + Send,
    {
        async move {
            match self {
                Ok(value) => on_success(value).await,
                Err(error) => on_failure(error).await,
            }
        }
    }
}

/// Conversion of foreign fallible values into an [`Outcome`]
pub trait IntoOutcome<T> {
    /// Convert, using the foreign error's message
    fn into_outcome(self) -> Outcome<T>;

    /// Convert, tagging the failure with `code`
    fn into_outcome_with_code(self, code: &str) -> Outcome<T>
    where
        Self: Sized,
    {
        self.into_outcome().map_err(|error| error.with_code(code))
    }
}

impl<T, E: Display> IntoOutcome<T> for Result<T, E> {
    fn into_outcome(self) -> Outcome<T> {
        self.map_err(|err| Error::new(err.to_string()))
    }
}

impl<T> IntoOutcome<T> for Option<T> {
    fn into_outcome(self) -> Outcome<T> {
        self.ok_or_else(|| Error::new("value is missing"))
    }
}
