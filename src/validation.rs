// Copyright 2025 Cowboy AI, LLC.

//! Validation chains over a single outcome
//!
//! A chain holds a context [`Outcome`] and any number of rules. Validating runs
//! every rule, never stopping at the first broken one, and folds the broken
//! rules into one failure with a detail per rule in declaration order. When all
//! rules hold, the original success comes back untouched.
//!
//! ```rust
//! use cim_result::{Error, OutcomeExt, Rule};
//!
//! struct Signup {
//!     email: String,
//!     age: u8,
//! }
//!
//! let signup = Signup { email: "nobody".into(), age: 12 };
//!
//! let checked = Ok::<_, Error>(signup)
//!     .validate()
//!     .rule(|s| s.email.contains('@'), Rule::new("email is malformed").at("email"))
//!     .rule(|s| s.age >= 18, Rule::new("too young").with_code("AGE").at("age"))
//!     .validate();
//!
//! let error = checked.error();
//! assert_eq!(error.details().len(), 2);
//! assert_eq!(error.details()[1].code(), Some("AGE"));
//! ```

use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::debug;

use crate::errors::{Error, VALIDATION_CODE, VALIDATION_MESSAGE};
use crate::outcome::Outcome;

/// Describes the failure recorded when a rule does not hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    message: String,
    code: Option<String>,
    path: Option<String>,
}

impl Rule {
    /// Create a rule description with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            path: None,
        }
    }

    /// Attach a code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the path of the validated member
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The detail error recorded for a broken rule
    pub fn to_error(&self) -> Error {
        let mut error = Error::new(self.message.clone());
        if let Some(code) = &self.code {
            error = error.with_code(code.clone());
        }
        if let Some(path) = &self.path {
            error = error.at(path.clone());
        }
        error
    }
}

impl From<&str> for Rule {
    fn from(message: &str) -> Self {
        Rule::new(message)
    }
}

impl From<String> for Rule {
    fn from(message: String) -> Self {
        Rule::new(message)
    }
}

/// Header of the aggregated failure
#[derive(Debug, Clone)]
struct Summary {
    message: String,
    code: String,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            message: VALIDATION_MESSAGE.to_string(),
            code: VALIDATION_CODE.to_string(),
        }
    }
}

impl Summary {
    fn into_outcome<T>(self, value: T, failures: Vec<Error>, rules: usize) -> Outcome<T> {
        debug!(rules, failures = failures.len(), "validation evaluated");
        if failures.is_empty() {
            Ok(value)
        } else {
            Err(Error::aggregate(self.message, failures).with_code(self.code))
        }
    }
}

type Check<'a, T> = Box<dyn FnOnce(&T) -> Option<Error> + 'a>;

/// Synchronous validation chain
pub struct Validator<'a, T> {
    context: Outcome<T>,
    checks: Vec<Check<'a, T>>,
    summary: Summary,
}

impl<'a, T> Validator<'a, T> {
    /// Start a chain against `context`
    pub fn new(context: Outcome<T>) -> Self {
        Self {
            context,
            checks: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Add a predicate; when it returns `false` the rule is recorded as a detail
    pub fn rule<P>(mut self, predicate: P, rule: impl Into<Rule>) -> Self
    where
        P: FnOnce(&T) -> bool + 'a,
    {
        let rule = rule.into();
        self.checks
            .push(Box::new(move |value: &T| (!predicate(value)).then(|| rule.to_error())));
        self
    }

    /// Add a nested check whose failure becomes a detail as-is
    pub fn rule_outcome<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&T) -> Outcome + 'a,
    {
        self.checks.push(Box::new(move |value: &T| check(value).err()));
        self
    }

    /// Replace the message of the aggregated failure
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.summary.message = message.into();
        self
    }

    /// Replace the code of the aggregated failure
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.summary.code = code.into();
        self
    }

    /// Number of rules in the chain
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether the chain has no rules
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Evaluate every rule
    ///
    /// A failed context is returned as is and no rule runs.
    pub fn validate(self) -> Outcome<T> {
        let value = self.context?;
        let rules = self.checks.len();
        let failures: Vec<Error> = self
            .checks
            .into_iter()
            .filter_map(|check| check(&value))
            .collect();
        self.summary.into_outcome(value, failures, rules)
    }
}

type AsyncCheck<'a, T> =
    Box<dyn for<'v> FnOnce(&'v T) -> BoxFuture<'v, Option<Error>> + Send + 'a>;

fn async_check<'a, T, F>(check: F) -> AsyncCheck<'a, T>
where
    F: for<'v> FnOnce(&'v T) -> BoxFuture<'v, Option<Error>> + Send + 'a,
{
    Box::new(check)
}

/// Validation chain whose rules are async and run concurrently
///
/// Rules borrow the context for the duration of the run, so the success value
/// handed back is the one the chain started with. Rules must not depend on
/// each other: they are all started together and awaited as a group.
///
/// ```rust
/// use cim_result::{AsyncValidator, Error};
/// use futures::FutureExt;
///
/// # tokio_test::block_on(async {
/// let checked = AsyncValidator::new(Ok::<_, Error>(String::from("alice")))
///     .rule(|name| async move { !name.is_empty() }.boxed(), "name is required")
///     .rule(|name| async move { name.len() > 8 }.boxed(), "name is too short")
///     .validate()
///     .await;
///
/// assert_eq!(checked.unwrap_err().details()[0].message(), "name is too short");
/// # });
/// ```
pub struct AsyncValidator<'a, T> {
    context: Outcome<T>,
    checks: Vec<AsyncCheck<'a, T>>,
    summary: Summary,
}

impl<'a, T> AsyncValidator<'a, T> {
    /// Start a chain against `context`
    pub fn new(context: Outcome<T>) -> Self {
        Self {
            context,
            checks: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Add an async predicate over a borrow of the context
    pub fn rule<P>(mut self, predicate: P, rule: impl Into<Rule>) -> Self
    where
        P: for<'v> FnOnce(&'v T) -> BoxFuture<'v, bool> + Send + 'a,
    {
        let rule = rule.into();
        self.checks.push(async_check(move |value| {
            let holds = predicate(value);
            async move { (!holds.await).then(|| rule.to_error()) }.boxed()
        }));
        self
    }

    /// Add an async nested check whose failure becomes a detail
    pub fn rule_outcome<F>(mut self, check: F) -> Self
    where
        F: for<'v> FnOnce(&'v T) -> BoxFuture<'v, Outcome> + Send + 'a,
    {
        self.checks
            .push(async_check(move |value| check(value).map(Result::err).boxed()));
        self
    }

    /// Replace the message of the aggregated failure
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.summary.message = message.into();
        self
    }

    /// Replace the code of the aggregated failure
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.summary.code = code.into();
        self
    }

    /// Number of rules in the chain
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether the chain has no rules
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every rule concurrently and collect failures in declaration order
    pub async fn validate(self) -> Outcome<T> {
        let value = self.context?;
        let rules = self.checks.len();
        let failures: Vec<Error> = {
            let pending: Vec<_> = self.checks.into_iter().map(|check| check(&value)).collect();
            join_all(pending).await.into_iter().flatten().collect()
        };
        self.summary.into_outcome(value, failures, rules)
    }
}
