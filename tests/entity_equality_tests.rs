// Copyright 2025 Cowboy AI, LLC.

//! Entity identity across types, proxies and transient instances.

use std::collections::HashSet;
use test_case::test_case;

use cim_result::{
    impl_entity_equality, Entity, EntityComparer, EntityId, ProxySuffixResolver,
};

#[derive(Debug, Clone)]
struct Customer {
    id: EntityId<Customer>,
    name: String,
}

impl Entity for Customer {
    type Id = EntityId<Customer>;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl_entity_equality!(Customer);

/// Stand-in for a lazy-loading wrapper generated around `Customer`
#[derive(Debug)]
struct CustomerProxy {
    target: Customer,
}

impl Entity for CustomerProxy {
    type Id = EntityId<Customer>;

    fn id(&self) -> &Self::Id {
        &self.target.id
    }
}

#[derive(Debug)]
struct Supplier {
    id: EntityId<Customer>,
}

impl Entity for Supplier {
    type Id = EntityId<Customer>;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug)]
struct Ticket {
    number: u64,
}

impl Entity for Ticket {
    type Id = u64;

    fn id(&self) -> &u64 {
        &self.number
    }
}

impl_entity_equality!(Ticket);

fn customer(id: EntityId<Customer>, name: &str) -> Customer {
    Customer { id, name: name.to_string() }
}

#[test]
fn test_same_id_same_type_is_equal_regardless_of_state() {
    let id = EntityId::new();
    let before = customer(id, "Ann");
    let after = customer(id, "Ann Smith");

    assert_eq!(before, after);
    assert_ne!(before.name, after.name);
}

#[test]
fn test_different_ids_are_not_equal() {
    assert_ne!(customer(EntityId::new(), "Ann"), customer(EntityId::new(), "Ann"));
}

#[test]
#[allow(clippy::eq_op)]
fn test_transient_entities_are_never_equal_to_others() {
    let a = customer(EntityId::transient(), "Ann");
    let b = customer(EntityId::transient(), "Ann");
    let assigned = customer(EntityId::new(), "Ann");

    assert!(a.is_transient());
    assert_ne!(a, b);
    assert_ne!(a, assigned);
    assert_ne!(assigned, a);
    assert_eq!(a, a);
}

#[test]
fn test_same_id_different_type_is_not_equal() {
    let id = EntityId::new();
    let customer = customer(id, "Ann");
    let supplier = Supplier { id };

    assert!(!EntityComparer::identity().equals(&customer, &supplier));
}

#[test_case("Proxy", true; "matching marker unwraps the proxy")]
#[test_case("Wrapper", false; "other marker leaves the proxy distinct")]
fn test_proxy_resolution(marker: &str, expected: bool) {
    let id = EntityId::new();
    let real = customer(id, "Ann");
    let proxy = CustomerProxy { target: customer(id, "Ann") };
    let comparer = EntityComparer::new(ProxySuffixResolver::new(marker));

    assert_eq!(comparer.equals(&real, &proxy), expected);
    assert_eq!(comparer.equals(&proxy, &real), expected);
    if expected {
        assert_eq!(comparer.hash_of(&real), comparer.hash_of(&proxy));
    }
}

#[test_case(0, true; "zero is unassigned")]
#[test_case(17, false; "non-zero is assigned")]
fn test_integer_identity(number: u64, transient: bool) {
    let ticket = Ticket { number };
    assert_eq!(ticket.is_transient(), transient);
    assert_eq!(ticket == Ticket { number }, !transient);
}

#[test]
fn test_hash_set_deduplicates_by_identity() {
    let id = EntityId::new();
    let set: HashSet<Customer> = [
        customer(id, "Ann"),
        customer(id, "Annie"),
        customer(EntityId::new(), "Bob"),
    ]
    .into_iter()
    .collect();

    assert_eq!(set.len(), 2);
}

#[test]
fn test_entity_ids_serialize_as_plain_uuids() {
    let id: EntityId<Customer> = EntityId::new();
    let json = serde_json::to_string(&id).unwrap();

    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    let back: EntityId<Customer> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
