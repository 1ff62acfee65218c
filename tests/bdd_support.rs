// Copyright 2025 Cowboy AI, LLC.

//! Shared BDD helpers for integration tests.
//! Keep this file pure and free of mediator wiring.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

/// Records the order in which pipeline steps ran.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    steps: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, step: impl Into<String>) {
        self.steps.lock().unwrap().push(step.into());
    }

    pub fn steps(&self) -> Vec<String> {
        self.steps.lock().unwrap().clone()
    }

    pub fn count(&self, step: &str) -> usize {
        self.steps.lock().unwrap().iter().filter(|s| *s == step).count()
    }
}

/// Assert that the recorded steps equal the expected list.
pub fn assert_steps(log: &ExecutionLog, expected: &[&str]) {
    let got = log.steps();
    let exp: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    assert_eq!(got, exp, "execution order mismatch: got={:?} expected={:?}", got, exp);
}

/// Convenience trait for asserting the execution order.
pub trait ExpectSteps {
    fn expect_steps(&self, expected: &[&str]);
}

impl ExpectSteps for ExecutionLog {
    fn expect_steps(&self, expected: &[&str]) {
        assert_steps(self, expected)
    }
}
