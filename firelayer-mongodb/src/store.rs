use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use tracing::trace;
use uuid::Uuid;

use firelayer_core::{
    backend::{StoreBackend, StoreBackendBuilder, StoredDocument},
    error::{StoreError, StoreResult},
    query::Query,
};

use crate::{query, sanitizer::ValueSanitizer};

const ID_FIELD: &str = "_id";

/// MongoDB document storage backend.
///
/// Every collection path (`books`, `books/b1/tags`) maps to its own MongoDB
/// collection; document ids are stored as string `_id` values.
#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, path: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&ValueSanitizer::sanitize_string(path))
    }

    fn prepare_document(id: &str, fields: &Document) -> Document {
        let mut document = doc! { ID_FIELD: id };
        document.extend(ValueSanitizer::sanitize_document(fields));
        document
    }

    fn restore_document(mut document: Document) -> StoreResult<StoredDocument> {
        let id = match document.remove(ID_FIELD) {
            Some(Bson::String(id)) => id,
            Some(other) => other.to_string(),
            None => {
                return Err(StoreError::Backend(
                    "stored document has no _id".to_string(),
                ));
            }
        };

        Ok(StoredDocument {
            id,
            fields: ValueSanitizer::restore_document(&document),
        })
    }

    /// Lists the MongoDB collections of the database, with their names restored.
    pub async fn collections(&self) -> StoreResult<Vec<String>> {
        let mut names: Vec<String> = self
            .client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .iter()
            .map(|name| ValueSanitizer::restore_string(name))
            .collect();
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        trace!(collection, id, "mongodb get");

        self.get_collection(collection)
            .find_one(doc! { ID_FIELD: id })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .map(|document| Self::restore_document(document).map(|stored| stored.fields))
            .transpose()
    }

    async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<StoredDocument>> {
        let filter = query::translate_filter(query.filter.as_ref())?;
        let mut options = FindOptions::default();
        options.limit = Some(i64::try_from(query.limit).unwrap_or(i64::MAX));
        options.sort = query.order.as_ref().map(query::translate_order);

        trace!(collection, %filter, limit = query.limit, "mongodb query");

        self.get_collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .into_iter()
            .map(Self::restore_document)
            .collect()
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: Document,
    ) -> StoreResult<Option<String>> {
        let id = Uuid::new_v4().simple().to_string();

        self.get_collection(collection)
            .insert_one(Self::prepare_document(&id, &fields))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Some(id))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<Option<String>> {
        self.get_collection(collection)
            .replace_one(doc! { ID_FIELD: id }, Self::prepare_document(id, &fields))
            .upsert(true)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Some(id.to_string()))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<bool> {
        Ok(self
            .get_collection(collection)
            .delete_one(doc! { ID_FIELD: id })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .deleted_count
            > 0)
    }

    async fn shutdown(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MongoDbStore::new(
            Client::with_options(
                ClientOptions::parse(&self.dsn)
                    .await
                    .map_err(|e| StoreError::Initialization(e.to_string()))?,
            )
            .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
