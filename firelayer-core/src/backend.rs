//! Storage backend abstraction for hierarchical document stores.
//!
//! A store is addressed by collection paths (`books`, `books/b1/tags`). Each document
//! in a collection has a string id and a field mapping. The traits here are the whole
//! boundary between firelayer and a concrete store.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`DynStoreBackend`]: A trait for dynamic dispatch over backend implementations
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # References
//!
//! Backends store document references in the tagged shape `{"__ref__": "<path>"}`,
//! produced by [`reference`]. Reads rewrite that shape into `{"path": "<path>"}`.

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use std::fmt::Debug;

use crate::{error::StoreResult, query::Query};

/// The key marking a stored document reference.
pub const REFERENCE_KEY: &str = "__ref__";

/// Builds the stored form of a reference to the document at `path`.
pub fn reference(path: impl Into<String>) -> Bson {
    Bson::Document(doc! { REFERENCE_KEY: path.into() })
}

/// Returns the referenced path when `value` is a stored reference.
pub fn as_reference(value: &Bson) -> Option<&str> {
    match value {
        Bson::Document(inner) if inner.len() == 1 => inner.get_str(REFERENCE_KEY).ok(),
        _ => None,
    }
}

/// A document returned by a query, paired with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// The document id within its collection.
    pub id: String,
    /// The stored field mapping, without the id.
    pub fields: Document,
}

/// Abstract interface for hierarchical document stores.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. Writes are last-write-wins; no implementation is expected to provide
/// optimistic concurrency control.
///
/// # Error Handling
///
/// Operations return [`StoreResult<T>`](crate::error::StoreResult). Backends report
/// their own failures as [`StoreError::Backend`](crate::error::StoreError::Backend).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Retrieves one document by id.
    ///
    /// # Arguments
    ///
    /// * `collection` - The collection path
    /// * `id` - The document id
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` when no such document exists.
    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Queries documents in a collection.
    ///
    /// The filter is applied first, then the ordering, then the cap.
    ///
    /// # Arguments
    ///
    /// * `collection` - The collection path
    /// * `query` - The filter, ordering and cap to apply
    async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<StoredDocument>>;

    /// Stores a new document under a freshly generated id.
    ///
    /// # Returns
    ///
    /// Returns the assigned id, or `None` if the store did not hand one back.
    async fn create_document(&self, collection: &str, fields: Document)
    -> StoreResult<Option<String>>;

    /// Overwrites (or creates) the document at `id` with `fields`.
    ///
    /// # Returns
    ///
    /// Returns the id that was written, or `None` if the store did not hand one back.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<String>>;

    /// Deletes the document at `id`.
    ///
    /// # Returns
    ///
    /// Returns whether the document existed before removal.
    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Object-safe counterpart of [`StoreBackend`], used by the process-wide connection.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;
    async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<StoredDocument>>;
    async fn create_document(&self, collection: &str, fields: Document)
    -> StoreResult<Option<String>>;
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<String>>;
    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<bool>;
}

#[async_trait]
impl<B: StoreBackend + Send + Sync + 'static> DynStoreBackend for B {
    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        StoreBackend::get_document(self, collection, id).await
    }

    async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<StoredDocument>> {
        StoreBackend::query_documents(self, collection, query).await
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: Document,
    ) -> StoreResult<Option<String>> {
        StoreBackend::create_document(self, collection, fields).await
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<String>> {
        StoreBackend::set_document(self, collection, id, fields).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<bool> {
        StoreBackend::delete_document(self, collection, id).await
    }
}

/// Factory trait for building backends from configuration.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_references() {
        let value = reference("users/u1");
        assert_eq!(as_reference(&value), Some("users/u1"));
        assert_eq!(as_reference(&Bson::String("users/u1".into())), None);
        assert_eq!(
            as_reference(&Bson::Document(doc! { "__ref__": "a/b", "other": 1 })),
            None
        );
    }
}
