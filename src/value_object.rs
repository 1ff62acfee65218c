// Copyright 2025 Cowboy AI, LLC.

//! Value objects: structural equality over equality components
//!
//! A value object lists the values that define it, in a fixed order. Equality,
//! hashing and ordering are all derived from that list, so two instances with
//! the same components are interchangeable.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::type_resolution::{IdentityResolver, TypeResolver};

/// One comparable equality component
#[derive(Debug, Clone)]
pub enum Component {
    /// Absent value; sorts before everything else
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer
    Int(i128),
    /// Floating point, compared with a total order
    Float(f64),
    /// Text
    Text(String),
    /// UUID
    Uuid(Uuid),
    /// Ordered nested components
    List(Vec<Component>),
}

impl Component {
    /// Name of the component's kind, used when kinds differ
    pub fn kind(&self) -> &'static str {
        match self {
            Component::Null => "null",
            Component::Bool(_) => "bool",
            Component::Int(_) => "int",
            Component::Float(_) => "float",
            Component::Text(_) => "text",
            Component::Uuid(_) => "uuid",
            Component::List(_) => "list",
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Component {}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        use Component::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Uuid(a), Uuid(b)) => a.cmp(b),
            (List(a), List(b)) => a.cmp(b),
            (a, b) => a.kind().cmp(b.kind()),
        }
    }
}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Component::Null => {}
            Component::Bool(v) => v.hash(state),
            Component::Int(v) => v.hash(state),
            Component::Float(v) => v.to_bits().hash(state),
            Component::Text(v) => v.hash(state),
            Component::Uuid(v) => v.hash(state),
            Component::List(v) => v.hash(state),
        }
    }
}

macro_rules! int_components {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Component {
                fn from(value: $int) -> Self {
                    Component::Int(value as i128)
                }
            }
        )*
    };
}

int_components!(i8, i16, i32, i64, i128, u8, u16, u32, u64, usize, isize);

impl From<bool> for Component {
    fn from(value: bool) -> Self {
        Component::Bool(value)
    }
}

impl From<f32> for Component {
    fn from(value: f32) -> Self {
        Component::Float(value as f64)
    }
}

impl From<f64> for Component {
    fn from(value: f64) -> Self {
        Component::Float(value)
    }
}

impl From<char> for Component {
    fn from(value: char) -> Self {
        Component::Text(value.to_string())
    }
}

impl From<&str> for Component {
    fn from(value: &str) -> Self {
        Component::Text(value.to_string())
    }
}

impl From<String> for Component {
    fn from(value: String) -> Self {
        Component::Text(value)
    }
}

impl From<&String> for Component {
    fn from(value: &String) -> Self {
        Component::Text(value.clone())
    }
}

impl From<Uuid> for Component {
    fn from(value: Uuid) -> Self {
        Component::Uuid(value)
    }
}

impl<T: Into<Component>> From<Option<T>> for Component {
    fn from(value: Option<T>) -> Self {
        value.map_or(Component::Null, Into::into)
    }
}

impl<T: Into<Component>> From<Vec<T>> for Component {
    fn from(values: Vec<T>) -> Self {
        Component::List(values.into_iter().map(Into::into).collect())
    }
}

/// A domain value defined entirely by its equality components
///
/// # Examples
///
/// ```rust
/// use cim_result::{impl_value_object, Component, ValueObject};
///
/// #[derive(Debug, Clone)]
/// struct Address {
///     street: String,
///     city: String,
///     postcode: Option<String>,
/// }
///
/// impl ValueObject for Address {
///     fn equality_components(&self) -> Vec<Component> {
///         vec![
///             self.street.as_str().into(),
///             self.city.as_str().into(),
///             self.postcode.clone().into(),
///         ]
///     }
/// }
///
/// impl_value_object!(Address);
///
/// let a = Address { street: "1 Main".into(), city: "Austin".into(), postcode: None };
/// let mut b = a.clone();
/// assert_eq!(a, b);
///
/// b.postcode = Some("78701".into());
/// assert_ne!(a, b);
/// assert!(a < b);
/// ```
pub trait ValueObject {
    /// The ordered components that define this value
    fn equality_components(&self) -> Vec<Component>;

    /// Concrete type name, before resolution
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Structural equality with another value of any value-object type
    fn value_eq<O: ValueObject + ?Sized>(&self, other: &O) -> bool {
        self.value_cmp(other) == Ordering::Equal
    }

    /// Structural hash consistent with [`value_eq`](ValueObject::value_eq)
    fn value_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.type_name().hash(&mut hasher);
        self.equality_components().hash(&mut hasher);
        hasher.finish()
    }

    /// Ordering without type-name resolution
    fn value_cmp<O: ValueObject + ?Sized>(&self, other: &O) -> Ordering {
        self.value_cmp_with(other, &IdentityResolver)
    }

    /// Ordering: resolved type names first, then components pairwise
    fn value_cmp_with<O, R>(&self, other: &O, resolver: &R) -> Ordering
    where
        O: ValueObject + ?Sized,
        R: TypeResolver + ?Sized,
    {
        resolver
            .resolve(self.type_name())
            .cmp(&resolver.resolve(other.type_name()))
            .then_with(|| {
                self.equality_components()
                    .cmp(&other.equality_components())
            })
    }
}

/// Implement `PartialEq`, `Eq`, `Hash`, `PartialOrd` and `Ord` through [`ValueObject`]
#[macro_export]
macro_rules! impl_value_object {
    ($($value:ty),+ $(,)?) => {
        $(
            impl ::core::cmp::PartialEq for $value {
                fn eq(&self, other: &Self) -> bool {
                    $crate::ValueObject::value_eq(self, other)
                }
            }

            impl ::core::cmp::Eq for $value {}

            impl ::core::hash::Hash for $value {
                fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                    state.write_u64($crate::ValueObject::value_hash(self));
                }
            }

            impl ::core::cmp::PartialOrd for $value {
                fn partial_cmp(&self, other: &Self) -> Option<::core::cmp::Ordering> {
                    Some(::core::cmp::Ord::cmp(self, other))
                }
            }

            impl ::core::cmp::Ord for $value {
                fn cmp(&self, other: &Self) -> ::core::cmp::Ordering {
                    $crate::ValueObject::value_cmp(self, other)
                }
            }
        )+
    };
}
