// Copyright 2025 Cowboy AI, LLC.

//! Structural equality and ordering of value objects.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use cim_result::{impl_value_object, Component, ProxySuffixResolver, ValueObject};

#[derive(Debug, Clone)]
struct Money {
    amount_minor: i64,
    currency: String,
}

impl ValueObject for Money {
    fn equality_components(&self) -> Vec<Component> {
        vec![self.currency.as_str().into(), self.amount_minor.into()]
    }
}

impl_value_object!(Money);

#[derive(Debug, Clone)]
struct DateRange {
    start_day: u32,
    end_day: Option<u32>,
    tags: Vec<String>,
}

impl ValueObject for DateRange {
    fn equality_components(&self) -> Vec<Component> {
        vec![
            self.start_day.into(),
            self.end_day.into(),
            self.tags.clone().into(),
        ]
    }
}

impl_value_object!(DateRange);

#[derive(Debug)]
struct MoneyProxy {
    inner: Money,
}

impl ValueObject for MoneyProxy {
    fn equality_components(&self) -> Vec<Component> {
        self.inner.equality_components()
    }
}

fn money(amount_minor: i64, currency: &str) -> Money {
    Money {
        amount_minor,
        currency: currency.to_string(),
    }
}

#[test]
fn test_values_with_same_components_are_interchangeable() {
    let mut seen = HashSet::new();
    seen.insert(money(500, "EUR"));

    assert!(seen.contains(&money(500, "EUR")));
    assert!(!seen.contains(&money(500, "USD")));
}

#[test]
fn test_optional_and_nested_components() {
    let open = DateRange { start_day: 1, end_day: None, tags: vec!["q1".into()] };
    let closed = DateRange { start_day: 1, end_day: Some(31), tags: vec!["q1".into()] };
    let retagged = DateRange { start_day: 1, end_day: None, tags: vec!["q2".into()] };

    assert_ne!(open, closed);
    assert!(open < closed, "absent end sorts first");
    assert!(open < retagged);
    assert_eq!(open, open.clone());
}

#[test]
fn test_sorted_set_orders_by_components() {
    let set: BTreeSet<Money> = [money(3, "USD"), money(1, "USD"), money(9, "CHF"), money(1, "USD")]
        .into_iter()
        .collect();

    let ordered: Vec<(String, i64)> = set
        .into_iter()
        .map(|m| (m.currency, m.amount_minor))
        .collect();
    assert_eq!(
        ordered,
        vec![
            ("CHF".to_string(), 9),
            ("USD".to_string(), 1),
            ("USD".to_string(), 3)
        ]
    );
}

#[test]
fn test_different_types_compare_by_type_name_first() {
    let amount = money(1, "USD");
    let range = DateRange { start_day: 1, end_day: None, tags: vec![] };

    assert!(!amount.value_eq(&range));
    assert_eq!(
        amount.value_cmp(&range),
        amount.type_name().cmp(range.type_name())
    );
}

#[test]
fn test_proxy_resolves_to_wrapped_type() {
    let amount = money(10, "GBP");
    let proxy = MoneyProxy { inner: amount.clone() };
    let resolver = ProxySuffixResolver::new("Proxy");

    assert_ne!(amount.value_cmp(&proxy), Ordering::Equal);
    assert_eq!(amount.value_cmp_with(&proxy, &resolver), Ordering::Equal);
}

fn any_money() -> impl Strategy<Value = Money> {
    (any::<i64>(), prop::sample::select(vec!["EUR", "USD", "JPY"]))
        .prop_map(|(amount, currency)| money(amount, currency))
}

proptest! {
    #[test]
    fn prop_equality_agrees_with_ordering_and_hash(a in any_money(), b in any_money()) {
        prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        if a == b {
            prop_assert_eq!(a.value_hash(), b.value_hash());
        }
    }

    #[test]
    fn prop_ordering_is_transitive(a in any_money(), b in any_money(), c in any_money()) {
        let mut sorted = [a, b, c];
        sorted.sort();
        prop_assert!(sorted[0] <= sorted[1]);
        prop_assert!(sorted[1] <= sorted[2]);
        prop_assert!(sorted[0] <= sorted[2]);
    }

    #[test]
    fn prop_float_components_have_total_order(x in any::<f64>(), y in any::<f64>()) {
        let (cx, cy) = (Component::from(x), Component::from(y));
        prop_assert_eq!(cx.cmp(&cy), x.total_cmp(&y));
        prop_assert_eq!(cx == cy, x.to_bits() == y.to_bits());
    }
}
