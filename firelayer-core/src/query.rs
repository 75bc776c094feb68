//! Query shape carried by collections until execution time.
//!
//! A [`Query`] holds at most one filter condition, at most one ordering condition and
//! a result cap. It is a plain value: composing a new query copies the old one.
//!
//! ```ignore
//! use firelayer::query::{Query, WhereCondition, FieldOp};
//!
//! let query = Query::builder()
//!     .filter(WhereCondition::new("title", FieldOp::Eq, "Math"))
//!     .limit(10)
//!     .build();
//! ```

use bson::Bson;
use std::{fmt, str::FromStr};

use crate::error::StoreError;

/// The default number of documents a query returns.
pub const DEFAULT_LIMIT: usize = 1000;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    #[default]
    Ascending,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Descending,
}

impl OrderDirection {
    /// Returns the canonical upper-case name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASCENDING",
            OrderDirection::Descending => "DESCENDING",
        }
    }
}

impl FromStr for OrderDirection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASCENDING" => Ok(OrderDirection::Ascending),
            "DESCENDING" => Ok(OrderDirection::Descending),
            _ => Err(StoreError::InvalidArgument(format!(
                "invalid order direction '{s}', expected ASCENDING or DESCENDING"
            ))),
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field comparison operators for filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (`==`).
    Eq,
    /// Not equal to (`!=`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal to (`<=`).
    Lte,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal to (`>=`).
    Gte,
    /// The array field contains the value (`array-contains`).
    ArrayContains,
    /// The array field contains any of the values (`array-contains-any`).
    ArrayContainsAny,
    /// The field equals one of the values (`in`).
    In,
    /// The field equals none of the values (`not-in`).
    NotIn,
}

impl FieldOp {
    /// Returns the operator as it is written in queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOp::Eq => "==",
            FieldOp::Ne => "!=",
            FieldOp::Lt => "<",
            FieldOp::Lte => "<=",
            FieldOp::Gt => ">",
            FieldOp::Gte => ">=",
            FieldOp::ArrayContains => "array-contains",
            FieldOp::ArrayContainsAny => "array-contains-any",
            FieldOp::In => "in",
            FieldOp::NotIn => "not-in",
        }
    }
}

impl FromStr for FieldOp {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "==" => FieldOp::Eq,
            "!=" => FieldOp::Ne,
            "<" => FieldOp::Lt,
            "<=" => FieldOp::Lte,
            ">" => FieldOp::Gt,
            ">=" => FieldOp::Gte,
            "array-contains" => FieldOp::ArrayContains,
            "array-contains-any" => FieldOp::ArrayContainsAny,
            "in" => FieldOp::In,
            "not-in" => FieldOp::NotIn,
            _ => {
                return Err(StoreError::InvalidArgument(format!(
                    "unknown operator '{s}'"
                )));
            }
        })
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filter predicate: `field op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub op: FieldOp,
    /// The value to compare against.
    pub value: Bson,
}

impl WhereCondition {
    /// Creates a new filter condition.
    pub fn new(field: impl Into<String>, op: FieldOp, value: impl Into<Bson>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// A single ordering clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCondition {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: OrderDirection,
}

impl OrderCondition {
    /// Creates a new ordering clause.
    pub fn new(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// A structured query against one collection path.
///
/// Use [`QueryBuilder`] for ergonomic construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Optional filter to match documents.
    pub filter: Option<WhereCondition>,
    /// Optional ordering for results.
    pub order: Option<OrderCondition>,
    /// Maximum number of documents to return.
    pub limit: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    /// Creates a new query with no filter, no ordering and the default cap.
    pub fn new() -> Self {
        Query {
            filter: None,
            order: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Returns a copy of this query with the filter replaced.
    pub fn with_filter(&self, filter: WhereCondition) -> Self {
        Query {
            filter: Some(filter),
            ..self.clone()
        }
    }

    /// Returns a copy of this query with the ordering replaced.
    pub fn with_order(&self, order: OrderCondition) -> Self {
        Query {
            order: Some(order),
            ..self.clone()
        }
    }

    /// Returns a copy of this query with the cap replaced.
    pub fn with_limit(&self, limit: usize) -> Self {
        Query {
            limit,
            ..self.clone()
        }
    }
}

/// Builder for constructing [`Query`] values.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new builder starting from the default query.
    pub fn new() -> Self {
        QueryBuilder {
            query: Query::new(),
        }
    }

    /// Sets the filter condition.
    pub fn filter(mut self, filter: WhereCondition) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the ordering condition.
    pub fn order(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.query.order = Some(OrderCondition::new(field, direction));
        self
    }

    /// Sets the result cap.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = limit;
        self
    }

    /// Consumes the builder and returns the query.
    pub fn build(self) -> Query {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directions() {
        assert_eq!(
            "ASCENDING".parse::<OrderDirection>().unwrap(),
            OrderDirection::Ascending
        );
        assert_eq!(
            "DESCENDING".parse::<OrderDirection>().unwrap(),
            OrderDirection::Descending
        );
        for invalid in ["sideways", "descending", "Ascending", ""] {
            assert!(matches!(
                invalid.parse::<OrderDirection>(),
                Err(StoreError::InvalidArgument(_))
            ));
        }
        assert_eq!(OrderDirection::default(), OrderDirection::Ascending);
    }

    #[test]
    fn parses_operators() {
        for op in [
            FieldOp::Eq,
            FieldOp::Ne,
            FieldOp::Lt,
            FieldOp::Lte,
            FieldOp::Gt,
            FieldOp::Gte,
            FieldOp::ArrayContains,
            FieldOp::ArrayContainsAny,
            FieldOp::In,
            FieldOp::NotIn,
        ] {
            assert_eq!(op.as_str().parse::<FieldOp>().unwrap(), op);
        }
        assert!("=~".parse::<FieldOp>().is_err());
    }

    #[test]
    fn composing_copies_the_query() {
        let base = Query::new();
        let filtered = base.with_filter(WhereCondition::new("title", FieldOp::Eq, "Math"));
        let ordered = filtered.with_order(OrderCondition::new("title", OrderDirection::Descending));

        assert_eq!(base, Query::new());
        assert!(filtered.order.is_none());
        assert_eq!(ordered.filter, filtered.filter);
        assert_eq!(ordered.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn builder_sets_fields() {
        let query = Query::builder()
            .filter(WhereCondition::new("age", FieldOp::Gt, 18))
            .order("age", OrderDirection::Ascending)
            .limit(5)
            .build();

        assert_eq!(query.limit, 5);
        assert_eq!(query.filter.unwrap().value, Bson::Int32(18));
        assert_eq!(query.order.unwrap().field, "age");
    }
}
