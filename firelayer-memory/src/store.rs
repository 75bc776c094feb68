//! In-memory storage implementation for hierarchical document stores.
//!
//! Documents are kept per collection path (`books`, `books/b1/tags`) in ordered maps
//! keyed by document id, behind an async-aware read-write lock.

use async_trait::async_trait;
use bson::Document;
use mea::rwlock::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tracing::trace;
use uuid::Uuid;

use firelayer_core::{
    backend::{StoreBackend, StoreBackendBuilder, StoredDocument},
    error::{StoreError, StoreResult},
    query::Query,
};

use crate::evaluator;

type CollectionMap = BTreeMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing it
/// to be safely shared across async tasks. Multiple clones of the same instance share
/// the same underlying data, so a test can keep a handle while the connection owns
/// another.
///
/// Queries scan every document of a collection; there is no indexing.
///
/// # Example
///
/// ```ignore
/// use firelayer_memory::InMemoryStore;
/// use firelayer_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.create_document("users", doc! { "name": "Alice" }).await?.unwrap();
/// assert!(store.get_document("users", &id).await?.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection path -> (document id -> fields)
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Loads documents from a JSON-like BSON mapping of
    /// `{ "<collection path>": { "<id>": { ...fields } } }`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when a collection or a document is not a mapping.
    pub async fn seed(&self, data: Document) -> StoreResult<usize> {
        let mut store = self.store.write().await;
        let mut loaded = 0;

        for (collection, documents) in data {
            let documents = documents.as_document().cloned().ok_or_else(|| {
                StoreError::InvalidArgument(format!("seed for {collection} is not a mapping"))
            })?;
            let collection_map = store.entry(collection.clone()).or_default();

            for (id, fields) in documents {
                let fields = fields.as_document().cloned().ok_or_else(|| {
                    StoreError::InvalidArgument(format!("seed for {collection}/{id} is not a mapping"))
                })?;
                collection_map.insert(id, fields);
                loaded += 1;
            }
        }

        Ok(loaded)
    }

    /// Returns the collection paths that hold at least one document.
    pub async fn collections(&self) -> Vec<String> {
        let mut collections: Vec<String> = self
            .store
            .read()
            .await
            .iter()
            .filter(|(_, documents)| !documents.is_empty())
            .map(|(path, _)| path.clone())
            .collect();
        collections.sort();
        collections
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self
            .store
            .read()
            .await
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<StoredDocument>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched: Vec<(&String, &Document)> = collection_map
            .iter()
            .filter(|(_, fields)| {
                query
                    .filter
                    .as_ref()
                    .is_none_or(|condition| evaluator::matches(fields, condition))
            })
            .collect();

        if let Some(order) = &query.order {
            matched.sort_by(|(_, a), (_, b)| evaluator::compare(a, b, order));
        }

        trace!(collection, matched = matched.len(), limit = query.limit, "memory query");

        Ok(matched
            .into_iter()
            .take(query.limit)
            .map(|(id, fields)| StoredDocument {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: Document,
    ) -> StoreResult<Option<String>> {
        let id = Uuid::new_v4().simple().to_string();

        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);

        Ok(Some(id))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<String>> {
        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);

        Ok(Some(id.to_string()))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<bool> {
        Ok(self
            .store
            .write()
            .await
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .is_some())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use firelayer_memory::InMemoryStore;
/// use firelayer_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder().seed(doc! { "users": { "u1": { "name": "Alice" } } }).build().await?;
/// ```
#[derive(Default, Debug)]
pub struct InMemoryStoreBuilder {
    seed: Option<Document>,
}

impl InMemoryStoreBuilder {
    /// Documents to load when the store is built.
    pub fn seed(mut self, data: Document) -> Self {
        self.seed = Some(data);
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let store = InMemoryStore::new();
        if let Some(data) = self.seed {
            store.seed(data).await?;
        }
        Ok(store)
    }
}
