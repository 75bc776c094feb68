//! Query primitives: the atomic operations against one collection path.
//!
//! Each call performs exactly one store round trip. Reads return plain field
//! mappings with the document `id` merged in and stored references rewritten to
//! `{"path": "<path>"}`.

use bson::{Bson, Document};
use std::sync::Arc;
use tracing::debug;

use crate::{
    backend::{DynStoreBackend, StoredDocument, as_reference},
    connection::Connection,
    error::{StoreError, StoreResult},
    query::{OrderCondition, Query, WhereCondition},
};

/// The key merged into every read mapping.
pub const ID_KEY: &str = "id";

/// Runs primitives against a single collection path.
#[derive(Debug, Clone)]
pub struct QueryRunner {
    path: String,
    backend: Arc<dyn DynStoreBackend>,
}

impl QueryRunner {
    /// Creates a runner bound to `path` on the current connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotConnected`] if no connection is installed.
    pub fn new(path: impl Into<String>) -> StoreResult<Self> {
        Ok(Self::with_backend(path, Connection::current()?))
    }

    /// Creates a runner bound to `path` on an explicit backend.
    pub fn with_backend(path: impl Into<String>, backend: Arc<dyn DynStoreBackend>) -> Self {
        Self {
            path: path.into(),
            backend,
        }
    }

    /// Returns the collection path of this runner.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fetches the document with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if the document does not exist.
    pub async fn get(&self, id: &str) -> StoreResult<Document> {
        debug!(path = %self.path, id, "get");

        match self.backend.get_document(&self.path, id).await? {
            Some(fields) => Ok(merge_id(id, fields)),
            None => Err(StoreError::DocumentNotFound(
                id.to_string(),
                self.path.clone(),
            )),
        }
    }

    /// Fetches every document in the collection, up to `limit`.
    pub async fn all(&self, limit: usize) -> StoreResult<Vec<Document>> {
        self.run(&Query::new().with_limit(limit)).await
    }

    /// Fetches the documents matching one predicate, up to `limit`.
    pub async fn filter(&self, condition: WhereCondition, limit: usize) -> StoreResult<Vec<Document>> {
        self.run(&Query::new().with_filter(condition).with_limit(limit))
            .await
    }

    /// Fetches documents sorted by one field, up to `limit`.
    pub async fn order(&self, condition: OrderCondition, limit: usize) -> StoreResult<Vec<Document>> {
        self.run(&Query::new().with_order(condition).with_limit(limit))
            .await
    }

    /// Runs a composed query: filter, then ordering, then cap.
    pub async fn run(&self, query: &Query) -> StoreResult<Vec<Document>> {
        debug!(
            path = %self.path,
            filter = ?query.filter,
            order = ?query.order,
            limit = query.limit,
            "query"
        );

        Ok(self
            .backend
            .query_documents(&self.path, query)
            .await?
            .into_iter()
            .map(|StoredDocument { id, fields }| merge_id(&id, fields))
            .collect())
    }

    /// Stores a new document and returns its generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SaveFailure`] if the store does not return an id.
    pub async fn create(&self, data: Document) -> StoreResult<String> {
        debug!(path = %self.path, "create");

        self.backend
            .create_document(&self.path, strip_id(data))
            .await?
            .ok_or_else(|| {
                StoreError::SaveFailure(format!("store returned no id creating in {}", self.path))
            })
    }

    /// Overwrites the document at `id` and returns the id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SaveFailure`] if the store does not return an id.
    pub async fn save(&self, id: &str, data: Document) -> StoreResult<String> {
        debug!(path = %self.path, id, "save");

        self.backend
            .set_document(&self.path, id, strip_id(data))
            .await?
            .ok_or_else(|| {
                StoreError::SaveFailure(format!("store returned no id saving {}/{id}", self.path))
            })
    }

    /// Deletes the document at `id`, returning whether it existed.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        debug!(path = %self.path, id, "delete");

        self.backend.delete_document(&self.path, id).await
    }
}

fn strip_id(mut data: Document) -> Document {
    data.remove(ID_KEY);
    data
}

fn merge_id(id: &str, fields: Document) -> Document {
    let mut merged = Document::new();
    merged.insert(ID_KEY, id);
    for (key, value) in fields {
        if key != ID_KEY {
            merged.insert(key, normalize(value));
        }
    }
    merged
}

/// Rewrites stored references, at any depth, into `{"path": "<path>"}`.
pub fn normalize(value: Bson) -> Bson {
    if let Some(path) = as_reference(&value) {
        let mut shape = Document::new();
        shape.insert("path", path);
        return Bson::Document(shape);
    }

    match value {
        Bson::Document(inner) => Bson::Document(
            inner
                .into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        Bson::Array(items) => Bson::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}
