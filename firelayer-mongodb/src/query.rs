//! Translation of filter and ordering conditions into MongoDB query documents.

use bson::{Bson, Document, doc};

use firelayer_core::{
    error::{StoreError, StoreResult},
    query::{FieldOp, OrderCondition, OrderDirection, WhereCondition},
};

use crate::sanitizer::ValueSanitizer;

/// Builds the `find` filter for an optional condition.
///
/// Documents missing the field never match, mirroring the in-memory store.
pub(crate) fn translate_filter(condition: Option<&WhereCondition>) -> StoreResult<Document> {
    let Some(condition) = condition else {
        return Ok(doc! {});
    };

    let field = ValueSanitizer::sanitize_string(&condition.field);
    let value = ValueSanitizer::sanitize_value(&condition.value);

    let predicate = match condition.op {
        FieldOp::Eq => doc! { "$eq": value },
        FieldOp::Ne => doc! { "$exists": true, "$ne": value },
        FieldOp::Lt => doc! { "$lt": value },
        FieldOp::Lte => doc! { "$lte": value },
        FieldOp::Gt => doc! { "$gt": value },
        FieldOp::Gte => doc! { "$gte": value },
        FieldOp::ArrayContains => doc! { "$elemMatch": { "$eq": value } },
        FieldOp::ArrayContainsAny => doc! { "$elemMatch": { "$in": expect_array(condition.op, value)? } },
        FieldOp::In => doc! { "$in": expect_array(condition.op, value)? },
        FieldOp::NotIn => doc! { "$exists": true, "$nin": expect_array(condition.op, value)? },
    };

    Ok(doc! { field: predicate })
}

/// Builds the `sort` document for an ordering condition.
pub(crate) fn translate_order(order: &OrderCondition) -> Document {
    doc! {
        ValueSanitizer::sanitize_string(&order.field): match order.direction {
            OrderDirection::Ascending => 1,
            OrderDirection::Descending => -1,
        }
    }
}

fn expect_array(op: FieldOp, value: Bson) -> StoreResult<Bson> {
    match value {
        Bson::Array(_) => Ok(value),
        other => Err(StoreError::InvalidArgument(format!(
            "operator '{op}' needs an array value, got {other}"
        ))),
    }
}
