//! Hierarchical storage paths.
//!
//! A store addresses documents as alternating collection and document segments:
//! `users/u1/books/b1`. Collection paths have an odd number of segments, document
//! paths an even number.

use crate::error::{StoreError, StoreResult};

/// Joins an optional parent document path and a leaf collection name into a collection path.
pub fn collection_path(parent: Option<&str>, leaf: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}/{leaf}"),
        None => leaf.to_string(),
    }
}

/// Joins a collection path and a document id into a document path.
pub fn document_path(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}

/// Returns `true` when `path` has a non-zero, even number of non-empty segments.
pub fn is_document_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    !segments.is_empty() && segments.len() % 2 == 0 && segments.iter().all(|s| !s.is_empty())
}

/// Splits a document path into its collection path and document id.
///
/// # Errors
///
/// Returns [`StoreError::InvalidArgument`] when the path contains empty segments or
/// does not address a document.
pub fn split_document_path(path: &str) -> StoreResult<(&str, &str)> {
    if !is_document_path(path) {
        return Err(StoreError::InvalidArgument(format!(
            "'{path}' is not a document path"
        )));
    }

    path.rsplit_once('/')
        .ok_or_else(|| StoreError::InvalidArgument(format!("'{path}' is not a document path")))
}

/// Returns the document that owns a nested collection path, or `None` for a top-level collection.
pub fn parent_document(collection_path: &str) -> Option<&str> {
    collection_path
        .rsplit_once('/')
        .map(|(parent, _)| parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_paths() {
        assert_eq!(collection_path(None, "books"), "books");
        assert_eq!(collection_path(Some("books/b1"), "tags"), "books/b1/tags");
        assert_eq!(document_path("books/b1/tags", "t1"), "books/b1/tags/t1");
    }

    #[test]
    fn splits_document_paths() {
        assert_eq!(split_document_path("books/b1").unwrap(), ("books", "b1"));
        assert_eq!(
            split_document_path("books/b1/tags/t1").unwrap(),
            ("books/b1/tags", "t1")
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(matches!(
            split_document_path("books"),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            split_document_path("books//tags/t1"),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(!is_document_path("books/b1/tags"));
        assert!(is_document_path("books/b1"));
    }

    #[test]
    fn finds_parent_documents() {
        assert_eq!(parent_document("books"), None);
        assert_eq!(parent_document("books/b1/tags"), Some("books/b1"));
    }
}
