//! BSON key escaping for MongoDB.
//!
//! MongoDB rejects field names containing dots, dollar signs and null bytes, and
//! collection names containing dollar signs or null bytes. Keys are escaped on the
//! way in and restored on the way out, at any depth. String values are stored
//! verbatim so that they compare and sort as written.

use bson::{Bson, Document};

pub(crate) struct ValueSanitizer;

impl ValueSanitizer {
    const REPLACEMENTS: [(&'static str, &'static str); 3] = [
        (".", "__dot__"),
        ("$", "__dollar__"),
        ("\0", "__null__"),
    ];

    /// Escapes a string.
    pub(crate) fn sanitize_string(input: &str) -> String {
        Self::REPLACEMENTS
            .iter()
            .fold(input.to_string(), |acc, (target, replacement)| {
                acc.replace(target, replacement)
            })
    }

    /// Reverts [`ValueSanitizer::sanitize_string`].
    pub(crate) fn restore_string(input: &str) -> String {
        Self::REPLACEMENTS
            .iter()
            .rev()
            .fold(input.to_string(), |acc, (target, replacement)| {
                acc.replace(replacement, target)
            })
    }

    /// Escapes the keys of embedded documents at any depth.
    pub(crate) fn sanitize_value(value: &Bson) -> Bson {
        Self::map_value(value, &Self::sanitize_string)
    }

    pub(crate) fn sanitize_document(document: &Document) -> Document {
        Self::map_document(document, &Self::sanitize_string)
    }

    pub(crate) fn restore_document(document: &Document) -> Document {
        Self::map_document(document, &Self::restore_string)
    }

    fn map_document(document: &Document, f: &dyn Fn(&str) -> String) -> Document {
        document
            .iter()
            .map(|(k, v)| (f(k), Self::map_value(v, f)))
            .collect()
    }

    fn map_value(value: &Bson, f: &dyn Fn(&str) -> String) -> Bson {
        match value {
            Bson::Array(items) => Bson::Array(
                items
                    .iter()
                    .map(|item| Self::map_value(item, f))
                    .collect(),
            ),
            Bson::Document(doc) => Bson::Document(Self::map_document(doc, f)),
            _ => value.clone(),
        }
    }
}
