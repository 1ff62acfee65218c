// Copyright 2025 Cowboy AI, LLC.

//! Type-name resolution for equality
//!
//! Entity and value-object equality compare type names. Some hosts wrap domain
//! types (lazy-loading proxies, tracking decorators) and those wrappers must not
//! break equality, so the name goes through a [`TypeResolver`] first. The
//! resolver is always passed in explicitly.

use std::borrow::Cow;
use std::fmt::Debug;

/// Maps a concrete type name to the name used for equality
pub trait TypeResolver: Debug + Send + Sync {
    /// Resolve `type_name` to the name of the underlying domain type
    fn resolve<'a>(&self, type_name: &'a str) -> Cow<'a, str>;
}

/// Uses type names unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityResolver;

impl TypeResolver for IdentityResolver {
    fn resolve<'a>(&self, type_name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(type_name)
    }
}

/// Unwraps proxy types
///
/// Two shapes are recognised:
/// - a generic wrapper, `module::Proxy<module::Order>` → `module::Order`
/// - a suffix, `module::OrderProxy` → `module::Order`
///
/// # Examples
///
/// ```rust
/// use cim_result::{ProxySuffixResolver, TypeResolver};
///
/// let resolver = ProxySuffixResolver::new("Proxy");
/// assert_eq!(resolver.resolve("app::Proxy<app::Order>"), "app::Order");
/// assert_eq!(resolver.resolve("app::OrderProxy"), "app::Order");
/// assert_eq!(resolver.resolve("app::Order"), "app::Order");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySuffixResolver {
    marker: String,
}

impl ProxySuffixResolver {
    /// Create a resolver for wrappers named with `marker`
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    fn unwrap_generic<'a>(&self, type_name: &'a str) -> Option<&'a str> {
        let open = type_name.find('<')?;
        let wrapper = &type_name[..open];
        let short = wrapper.rsplit("::").next().unwrap_or(wrapper);
        if short != self.marker || !type_name.ends_with('>') {
            return None;
        }
        Some(&type_name[open + 1..type_name.len() - 1])
    }
}

impl TypeResolver for ProxySuffixResolver {
    fn resolve<'a>(&self, type_name: &'a str) -> Cow<'a, str> {
        if self.marker.is_empty() {
            return Cow::Borrowed(type_name);
        }
        if let Some(inner) = self.unwrap_generic(type_name) {
            return self.resolve(inner);
        }
        match type_name.strip_suffix(self.marker.as_str()) {
            Some(stripped) if !stripped.is_empty() && !stripped.ends_with("::") => {
                Cow::Borrowed(stripped)
            }
            _ => Cow::Borrowed(type_name),
        }
    }
}
