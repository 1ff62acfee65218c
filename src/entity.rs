// Copyright 2025 Cowboy AI, LLC.

//! Entities: identity-based equality and a domain-event queue
//!
//! Two entities are the same entity when their resolved type names match and
//! they carry equal identifiers. An entity whose identifier has not been
//! assigned yet (a *transient* entity) is only ever equal to itself.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::type_resolution::{IdentityResolver, TypeResolver};

/// A typed entity ID using phantom types for type safety
///
/// The phantom parameter keeps IDs of different entity types apart at
/// compile time. The nil UUID marks a transient (unassigned) ID.
///
/// # Examples
///
/// ```rust
/// use cim_result::{EntityId, Identifier};
///
/// struct User;
/// struct Product;
///
/// let user_id = EntityId::<User>::new();
/// assert!(!user_id.is_transient());
///
/// // Explicit cast between ID types (use carefully)
/// let casted: EntityId<Product> = user_id.cast();
/// assert_eq!(casted.as_uuid(), user_id.as_uuid());
///
/// assert!(EntityId::<User>::transient().is_transient());
/// ```
pub struct EntityId<T> {
    id: Uuid,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> EntityId<T> {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// An unassigned ID
    pub fn transient() -> Self {
        Self::from_uuid(Uuid::nil())
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.id
    }

    /// Convert to a different entity ID type (use with caution)
    pub fn cast<U>(self) -> EntityId<U> {
        EntityId::from_uuid(self.id)
    }
}

impl<T> Clone for EntityId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EntityId<T> {}

impl<T> PartialEq for EntityId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for EntityId<T> {}

impl<T> Hash for EntityId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> PartialOrd for EntityId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for EntityId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> Debug for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityId").field(&self.id).finish()
    }
}

impl<T> fmt::Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> Default for EntityId<T> {
    fn default() -> Self {
        Self::transient()
    }
}

impl<T> From<EntityId<T>> for Uuid {
    fn from(id: EntityId<T>) -> Self {
        id.id
    }
}

impl<T> Serialize for EntityId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for EntityId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

/// An identifier that knows whether it has been assigned
pub trait Identifier: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Whether the identifier still holds its default, unassigned value
    fn is_transient(&self) -> bool;
}

impl Identifier for Uuid {
    fn is_transient(&self) -> bool {
        self.is_nil()
    }
}

impl<T: 'static> Identifier for EntityId<T> {
    fn is_transient(&self) -> bool {
        self.id.is_nil()
    }
}

impl Identifier for String {
    fn is_transient(&self) -> bool {
        self.is_empty()
    }
}

impl<I: Identifier> Identifier for Option<I> {
    fn is_transient(&self) -> bool {
        self.as_ref().map_or(true, Identifier::is_transient)
    }
}

macro_rules! integer_identifiers {
    ($($int:ty),*) => {
        $(
            impl Identifier for $int {
                fn is_transient(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_identifiers!(i32, i64, i128, u32, u64, u128, usize);

/// A domain object with identity
pub trait Entity {
    /// The identifier type
    type Id: Identifier;

    /// The identifier
    fn id(&self) -> &Self::Id;

    /// Concrete type name, before resolution
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether the identifier has not been assigned yet
    fn is_transient(&self) -> bool {
        self.id().is_transient()
    }
}

/// Identity-based equality, hashing and ordering for entities
///
/// The resolver decides which type names count as the same type.
///
/// # Examples
///
/// ```rust
/// use cim_result::{Entity, EntityComparer, EntityId, ProxySuffixResolver};
///
/// struct Order { id: EntityId<Order> }
/// struct OrderProxy { inner: Order }
///
/// impl Entity for Order {
///     type Id = EntityId<Order>;
///     fn id(&self) -> &Self::Id { &self.id }
/// }
///
/// impl Entity for OrderProxy {
///     type Id = EntityId<Order>;
///     fn id(&self) -> &Self::Id { &self.inner.id }
/// }
///
/// let id = EntityId::new();
/// let order = Order { id };
/// let proxy = OrderProxy { inner: Order { id } };
///
/// assert!(!EntityComparer::identity().equals(&order, &proxy));
/// assert!(EntityComparer::new(ProxySuffixResolver::new("Proxy")).equals(&order, &proxy));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityComparer<R = IdentityResolver> {
    resolver: R,
}

impl EntityComparer<IdentityResolver> {
    /// A comparer that uses type names unchanged
    pub fn identity() -> Self {
        Self::default()
    }
}

impl<R: TypeResolver> EntityComparer<R> {
    /// Create a comparer using `resolver`
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// The resolver in use
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Whether `a` and `b` are the same entity
    pub fn equals<A, B>(&self, a: &A, b: &B) -> bool
    where
        A: Entity + ?Sized,
        B: Entity<Id = A::Id> + ?Sized,
    {
        if a.is_transient() || b.is_transient() {
            let same_object = std::ptr::eq(a as *const A as *const u8, b as *const B as *const u8);
            return same_object && a.type_name() == b.type_name();
        }

        self.resolver.resolve(a.type_name()) == self.resolver.resolve(b.type_name())
            && a.id() == b.id()
    }

    /// Feed the entity's identity into `state`
    pub fn hash_into<E, H>(&self, entity: &E, state: &mut H)
    where
        E: Entity + ?Sized,
        H: Hasher,
    {
        self.resolver.resolve(entity.type_name()).hash(state);
        entity.id().hash(state);
    }

    /// Hash consistent with [`equals`](Self::equals)
    pub fn hash_of<E: Entity + ?Sized>(&self, entity: &E) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(entity, &mut hasher);
        hasher.finish()
    }

    /// Order by resolved type name, then by identifier
    pub fn compare<A, B>(&self, a: &A, b: &B) -> Ordering
    where
        A: Entity + ?Sized,
        B: Entity<Id = A::Id> + ?Sized,
        A::Id: Ord,
    {
        self.resolver
            .resolve(a.type_name())
            .cmp(&self.resolver.resolve(b.type_name()))
            .then_with(|| a.id().cmp(b.id()))
    }
}

/// Events raised by an entity, waiting to be dispatched
///
/// [`take`](DomainEvents::take) empties the queue, so each event is handed out
/// exactly once.
#[derive(Debug, Clone)]
pub struct DomainEvents<E> {
    pending: Vec<E>,
}

impl<E> Default for DomainEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> DomainEvents<E> {
    /// An empty queue
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Queue an event
    pub fn raise(&mut self, event: E) {
        self.pending.push(event);
    }

    /// Queued events, oldest first
    pub fn pending(&self) -> &[E] {
        &self.pending
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every queued event
    pub fn take(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }

    /// Drop every queued event
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Entities that buffer domain events for a unit of work
pub trait HasDomainEvents {
    /// Event type raised by this entity
    type Event;

    /// The queue
    fn domain_events(&self) -> &DomainEvents<Self::Event>;

    /// The queue, mutably
    fn domain_events_mut(&mut self) -> &mut DomainEvents<Self::Event>;

    /// Queue an event
    fn raise_event(&mut self, event: Self::Event) {
        self.domain_events_mut().raise(event);
    }

    /// Drain the queue
    fn take_domain_events(&mut self) -> Vec<Self::Event> {
        self.domain_events_mut().take()
    }
}

/// Implement `PartialEq`, `Eq` and `Hash` through [`EntityComparer`]
///
/// Uses the [`IdentityResolver`]; types needing proxy resolution should call a
/// configured comparer directly.
#[macro_export]
macro_rules! impl_entity_equality {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl ::core::cmp::PartialEq for $entity {
                fn eq(&self, other: &Self) -> bool {
                    $crate::EntityComparer::identity().equals(self, other)
                }
            }

            impl ::core::cmp::Eq for $entity {}

            impl ::core::hash::Hash for $entity {
                fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                    $crate::EntityComparer::identity()
                        .hash_into(self, state)
                }
            }
        )+
    };
}
