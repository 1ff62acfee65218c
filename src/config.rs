// Copyright 2025 Cowboy AI, LLC.

//! Mediator configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{MediatorError, MediatorResult};

/// Runtime switches for a [`Mediator`](crate::Mediator)
///
/// Every field has a default, so a partial JSON document is accepted:
///
/// ```rust
/// use cim_result::MediatorConfig;
///
/// let config = MediatorConfig::from_json_str(r#"{ "cache_plans": false }"#).unwrap();
/// assert!(!config.cache_plans);
/// assert!(config.trace_dispatch);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MediatorConfig {
    /// Open a tracing span per dispatch and log pipeline events
    pub trace_dispatch: bool,
    /// Cache resolution plans per request type
    pub cache_plans: bool,
    /// Keep delivering a notification after one of its handlers fails
    pub publish_continue_on_failure: bool,
    /// Warn when a dispatch takes longer than this many milliseconds
    pub slow_dispatch_ms: Option<u64>,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            trace_dispatch: true,
            cache_plans: true,
            publish_continue_on_failure: true,
            slow_dispatch_ms: None,
        }
    }
}

impl MediatorConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> MediatorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot take effect
    pub fn validate(&self) -> MediatorResult<()> {
        if self.slow_dispatch_ms == Some(0) {
            return Err(MediatorError::InvalidConfiguration(
                "slow_dispatch_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The slow-dispatch threshold as a duration
    pub fn slow_dispatch_threshold(&self) -> Option<Duration> {
        self.slow_dispatch_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = MediatorConfig::default();
        assert!(config.trace_dispatch);
        assert!(config.cache_plans);
        assert!(config.publish_continue_on_failure);
        assert_eq!(config.slow_dispatch_threshold(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = MediatorConfig {
            slow_dispatch_ms: Some(250),
            publish_continue_on_failure: false,
            ..MediatorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();

        assert_eq!(MediatorConfig::from_json_str(&json).unwrap(), config);
        assert_eq!(
            config.slow_dispatch_threshold(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let result = MediatorConfig::from_json_str(r#"{ "slow_dispatch_ms": 0 }"#);
        assert!(matches!(result, Err(MediatorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = MediatorConfig::from_json_str("{ trace_dispatch: yes }");
        assert!(matches!(result, Err(MediatorError::Serialization(_))));
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(MediatorConfig)).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for field in ["trace_dispatch", "cache_plans", "publish_continue_on_failure", "slow_dispatch_ms"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
    }
}
