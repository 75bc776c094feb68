//! Condition evaluation for in-memory document filtering and ordering.
//!
//! This module provides the comparison rules the in-memory store applies to a single
//! [`WhereCondition`] and a single [`OrderCondition`].

use bson::{Bson, DateTime, Document};
use std::{cmp::Ordering, collections::HashMap};

use firelayer_core::query::{FieldOp, OrderCondition, OrderDirection, WhereCondition};

/// Type-erased, comparable representation of BSON values.
///
/// Integers compare exactly with each other; mixed with doubles they compare as f64,
/// so `Int32(3) == Double(3.0)`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (Int32 and Int64)
    Integer(i64),
    /// Floating-point value
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Integer(i64::from(*value)),
            Bson::Int64(value) => Comparable::Integer(*value),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            _ => Comparable::Null,
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Integer(a), Comparable::Integer(b)) => a == b,
            (Comparable::Integer(a), Comparable::Number(b)) => (*a as f64) == *b,
            (Comparable::Number(a), Comparable::Integer(b)) => *a == (*b as f64),
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Integer(b)) => a.partial_cmp(b),
            (Comparable::Integer(a), Comparable::Number(b)) => (*a as f64).partial_cmp(b),
            (Comparable::Number(a), Comparable::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Comparable<'_> {
    // Rank used to order values of different types: null first, then booleans,
    // numbers, timestamps, strings, arrays, maps.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Bool(_) => 1,
            Comparable::Integer(_) | Comparable::Number(_) => 2,
            Comparable::DateTime(_) => 3,
            Comparable::String(_) => 4,
            Comparable::Array(_) => 5,
            Comparable::Map(_) => 6,
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other)
            .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank()))
    }
}

/// Returns `true` when `document` satisfies `condition`.
///
/// A document missing the field never matches, whatever the operator.
pub(crate) fn matches(document: &Document, condition: &WhereCondition) -> bool {
    let Some(field_value) = document.get(&condition.field) else {
        return false;
    };

    let left = Comparable::from(field_value);
    let right = Comparable::from(&condition.value);

    match condition.op {
        FieldOp::Eq => left == right,
        FieldOp::Ne => left != right,
        FieldOp::Lt | FieldOp::Lte | FieldOp::Gt | FieldOp::Gte => {
            match left.partial_cmp(&right) {
                Some(ordering) => match condition.op {
                    FieldOp::Lt => ordering == Ordering::Less,
                    FieldOp::Lte => ordering != Ordering::Greater,
                    FieldOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
                None => false,
            }
        }
        FieldOp::ArrayContains => match left {
            Comparable::Array(items) => items.iter().any(|item| *item == right),
            _ => false,
        },
        FieldOp::ArrayContainsAny => match (left, right) {
            (Comparable::Array(items), Comparable::Array(candidates)) => candidates
                .iter()
                .any(|candidate| items.contains(candidate)),
            _ => false,
        },
        FieldOp::In => match right {
            Comparable::Array(candidates) => candidates.contains(&left),
            _ => false,
        },
        FieldOp::NotIn => match right {
            Comparable::Array(candidates) => !candidates.contains(&left),
            _ => false,
        },
    }
}

/// Compares two documents by the ordering field. Missing fields sort as null.
pub(crate) fn compare(left: &Document, right: &Document, order: &OrderCondition) -> Ordering {
    let left = left
        .get(&order.field)
        .map(Comparable::from)
        .unwrap_or(Comparable::Null);
    let right = right
        .get(&order.field)
        .map(Comparable::from)
        .unwrap_or(Comparable::Null);

    match order.direction {
        OrderDirection::Ascending => left.total_cmp(&right),
        OrderDirection::Descending => right.total_cmp(&left),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn condition(field: &str, op: FieldOp, value: impl Into<Bson>) -> WhereCondition {
        WhereCondition::new(field, op, value)
    }

    #[test]
    fn compares_scalars() {
        let book = doc! { "title": "Math", "pages": 120 };

        assert!(matches(&book, &condition("title", FieldOp::Eq, "Math")));
        assert!(matches(&book, &condition("title", FieldOp::Ne, "History")));
        assert!(matches(&book, &condition("pages", FieldOp::Gt, 100.0)));
        assert!(matches(&book, &condition("pages", FieldOp::Lte, 120)));
        assert!(!matches(&book, &condition("pages", FieldOp::Lt, 120)));
        assert!(!matches(&book, &condition("pages", FieldOp::Gt, "a string")));
    }

    #[test]
    fn compares_large_integers_exactly() {
        let record = doc! { "counter": 9_007_199_254_740_993_i64 };

        assert!(!matches(&record, &condition("counter", FieldOp::Eq, 9_007_199_254_740_992_i64)));
        assert!(matches(&record, &condition("counter", FieldOp::Eq, 9_007_199_254_740_993_i64)));
        assert!(matches(&record, &condition("counter", FieldOp::Gt, 9_007_199_254_740_992_i64)));
        assert!(matches(&doc! { "pages": 3 }, &condition("pages", FieldOp::Eq, 3_i64)));
        assert!(matches(&doc! { "pages": 3 }, &condition("pages", FieldOp::Eq, 3.0)));
    }

    #[test]
    fn missing_fields_never_match() {
        let book = doc! { "title": "Math" };

        assert!(!matches(&book, &condition("author", FieldOp::Ne, "John")));
        assert!(!matches(&book, &condition("author", FieldOp::NotIn, vec!["John"])));
    }

    #[test]
    fn evaluates_array_operators() {
        let book = doc! { "authors": ["John", "Mary"], "title": "Math" };

        assert!(matches(&book, &condition("authors", FieldOp::ArrayContains, "Mary")));
        assert!(!matches(&book, &condition("authors", FieldOp::ArrayContains, "Paul")));
        assert!(matches(
            &book,
            &condition("authors", FieldOp::ArrayContainsAny, vec!["Paul", "John"])
        ));
        assert!(matches(&book, &condition("title", FieldOp::In, vec!["Math", "Art"])));
        assert!(!matches(&book, &condition("title", FieldOp::NotIn, vec!["Math"])));
    }

    #[test]
    fn orders_mixed_values() {
        let by_title = OrderCondition::new("title", OrderDirection::Ascending);
        let math = doc! { "title": "Math" };
        let untitled = doc! {};

        assert_eq!(compare(&untitled, &math, &by_title), Ordering::Less);
        assert_eq!(
            compare(
                &math,
                &untitled,
                &OrderCondition::new("title", OrderDirection::Descending)
            ),
            Ordering::Less
        );
    }
}
