//! Plain JSON rendering of entities.

use bson::Bson;
use serde_json::{Map, Number, Value};

use crate::registry::Registry;

/// Options controlling [`ModelExt::as_json`](crate::model::ModelExt::as_json).
///
/// # Example
///
/// ```ignore
/// let json = book
///     .as_json(&JsonOptions::new().recursive(true).excepts(["id"]).include(["user"]).registry(&registry))
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonOptions<'a> {
    /// Expand subcollection fields inline as lists.
    pub recursive: bool,
    /// Extra attributes to inline: declared fields, subcollections, relationship
    /// accessors or computed accessors.
    pub include: Vec<String>,
    /// Fields to drop from the rendered mapping.
    pub excepts: Vec<String>,
    /// Registry consulted for relationship and computed accessors.
    pub registry: Option<&'a Registry>,
}

impl<'a> JsonOptions<'a> {
    /// Creates default options: not recursive, nothing included or excepted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether subcollections are expanded.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Adds names to inline.
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds names to drop.
    pub fn excepts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excepts
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the registry used to resolve relationship accessors.
    pub fn registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Options for rendering nested values: keeps the registry and recursion flag
    /// but drops `include` and `excepts`.
    pub fn nested(&self) -> JsonOptions<'a> {
        JsonOptions {
            recursive: self.recursive,
            include: Vec::new(),
            excepts: Vec::new(),
            registry: self.registry,
        }
    }

    pub(crate) fn is_excepted(&self, name: &str) -> bool {
        self.excepts.iter().any(|e| e == name)
    }
}

/// Converts a BSON value into plain JSON.
///
/// Timestamps render as RFC 3339 strings, object ids as hex strings.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::Number(i.into()),
        Bson::Int64(i) => Value::Number(i.into()),
        Bson::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect::<Map<String, Value>>(),
        ),
        Bson::DateTime(dt) => Value::String(dt.to_chrono().to_rfc3339()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        other => Value::String(other.to_string()),
    }
}

/// Converts plain JSON into BSON. Integral numbers become `Int64` unless they fit in `Int32`.
pub fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i32::try_from(i).map_or(Bson::Int64(i), Bson::Int32),
            (None, Some(f)) => Bson::Double(f),
            (None, None) => Bson::String(n.to_string()),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.into_iter()
                .map(|(key, value)| (key, json_to_bson(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{DateTime, doc};
    use serde_json::json;

    #[test]
    fn renders_bson_as_plain_json() {
        let when = DateTime::from_millis(0);
        let value = bson_to_json(Bson::Document(doc! {
            "title": "Math",
            "pages": 120,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "published": when,
            "missing": Bson::Null,
        }));

        assert_eq!(
            value,
            json!({
                "title": "Math",
                "pages": 120,
                "ratio": 0.5,
                "tags": ["a", "b"],
                "published": "1970-01-01T00:00:00+00:00",
                "missing": null,
            })
        );
    }

    #[test]
    fn parses_json_numbers_narrowly() {
        assert_eq!(json_to_bson(json!(3)), Bson::Int32(3));
        assert_eq!(json_to_bson(json!(5_000_000_000_i64)), Bson::Int64(5_000_000_000));
        assert_eq!(json_to_bson(json!(1.5)), Bson::Double(1.5));
    }

    #[test]
    fn option_builders_accumulate() {
        let options = JsonOptions::new()
            .recursive(true)
            .include(["user"])
            .excepts(["id", "title"]);

        assert!(options.recursive);
        assert_eq!(options.include, vec!["user".to_string()]);
        assert!(options.is_excepted("title"));
        assert!(options.nested().include.is_empty());
    }
}
