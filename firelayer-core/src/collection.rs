//! The query composer: a lazy, chainable view over a set of documents.
//!
//! A [`Collection`] carries a model type, an optional owner document path, and a
//! [`Query`]. Composing (`filter`, `order`, `all`, `limit`) never mutates the receiver;
//! each call returns a new collection. Nothing is read until [`Collection::fetch`],
//! [`Collection::stream`] or [`Collection::first`] runs, and each of those performs
//! exactly one store read.
//!
//! # Example
//!
//! ```ignore
//! use firelayer::prelude::*;
//!
//! let titles: Vec<String> = Book::order("title", "DESCENDING")?
//!     .filter("user_id", FieldOp::Eq, "u1")
//!     .fetch()
//!     .await?
//!     .into_iter()
//!     .map(|book| book.title)
//!     .collect();
//! ```

use bson::Bson;
use futures::{
    StreamExt, TryStreamExt,
    future::BoxFuture,
    stream::{self, BoxStream},
};
use serde_json::Value;
use std::{any::Any, fmt::Debug, marker::PhantomData};

use crate::{
    error::{StoreError, StoreResult},
    json::JsonOptions,
    model::{AnyModel, Model, ModelExt, materialize},
    path,
    primitives::QueryRunner,
    query::{FieldOp, OrderCondition, OrderDirection, Query, WhereCondition},
};

/// A lazy collection of `M`, either top-level or nested under an owner document.
#[derive(Debug)]
pub struct Collection<M> {
    owner: Option<String>,
    query: Query,
    _marker: PhantomData<fn() -> M>,
}

impl<M> Clone for Collection<M> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            query: self.query.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M: Model> Default for Collection<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Collection<M> {
    /// The top-level collection of `M`.
    pub fn new() -> Self {
        Self {
            owner: None,
            query: Query::new(),
            _marker: PhantomData,
        }
    }

    /// The collection of `M` nested under the document at `owner`.
    pub fn nested(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            query: Query::new(),
            _marker: PhantomData,
        }
    }

    /// The collection path the query runs against.
    pub fn path(&self) -> String {
        path::collection_path(self.owner.as_deref(), &M::collection_name())
    }

    /// The owner document path, for nested collections.
    pub fn owner_path(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The accumulated query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    fn with_query(&self, query: Query) -> Self {
        Self {
            owner: self.owner.clone(),
            query,
            _marker: PhantomData,
        }
    }

    /// A new collection with the filter replaced.
    pub fn filter(&self, field: impl Into<String>, op: FieldOp, value: impl Into<Bson>) -> Self {
        self.with_filter(WhereCondition::new(field, op, value))
    }

    /// A new collection with the filter replaced by `condition`.
    pub fn with_filter(&self, condition: WhereCondition) -> Self {
        self.with_query(self.query.with_filter(condition))
    }

    /// A new collection ordered by `field` in `direction`, keeping any filter.
    pub fn order_by(&self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.with_order(OrderCondition::new(field, direction))
    }

    /// A new collection with the ordering replaced by `condition`.
    pub fn with_order(&self, condition: OrderCondition) -> Self {
        self.with_query(self.query.with_order(condition))
    }

    /// A new collection ordered by `field`, parsing `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] unless `direction` is `ASCENDING` or
    /// `DESCENDING`, matched exactly.
    pub fn order(&self, field: impl Into<String>, direction: &str) -> StoreResult<Self> {
        Ok(self.order_by(field, direction.parse()?))
    }

    /// A new collection ordered ascending by `field`.
    pub fn order_asc(&self, field: impl Into<String>) -> Self {
        self.order_by(field, OrderDirection::default())
    }

    /// A new collection with the same shape.
    pub fn all(&self) -> Self {
        self.clone()
    }

    /// A new collection with the result cap replaced.
    pub fn limit(&self, limit: usize) -> Self {
        self.with_query(self.query.with_limit(limit))
    }

    /// Runs the query once and materializes the results.
    pub async fn fetch(&self) -> StoreResult<Vec<M>> {
        let path = self.path();
        let documents = QueryRunner::new(path.as_str())?
            .run(&self.query)
            .await?;

        documents
            .into_iter()
            .map(|fields| materialize(fields, self.owner.clone(), None))
            .collect()
    }

    /// Streams the results. The single read happens on first poll.
    pub fn stream(&self) -> BoxStream<'static, StoreResult<M>> {
        let this = self.clone();

        stream::once(async move { this.fetch().await })
            .map_ok(|items| stream::iter(items.into_iter().map(Ok::<M, StoreError>)))
            .try_flatten()
            .boxed()
    }

    /// The first result, or `None` when the query matches nothing.
    pub async fn first(&self) -> StoreResult<Option<M>> {
        Ok(self
            .limit(1)
            .fetch()
            .await?
            .into_iter()
            .next())
    }

    /// The number of matching documents.
    pub async fn count(&self) -> StoreResult<usize> {
        let path = self.path();
        Ok(QueryRunner::new(path.as_str())?
            .run(&self.query)
            .await?
            .len())
    }

    /// Creates `entity` in this collection and writes the new id back to it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] if the entity already has an id.
    pub async fn add(&self, entity: &mut M) -> StoreResult<String> {
        if let Some(id) = entity.id() {
            return Err(StoreError::InvalidState(format!(
                "{} {id} is already saved; add only creates new documents",
                M::model_name()
            )));
        }

        entity.meta_mut().set_parent(self.owner.clone());
        entity.meta_mut().set_override_path(None);

        let path = self.path();
        let id = QueryRunner::new(path.as_str())?
            .create(entity.to_document()?)
            .await?;

        entity.set_id(Some(id.clone()));
        let document_path = entity.path()?;
        entity.bind_subcollections(&document_path);

        Ok(id)
    }

    /// Renders every result as plain JSON.
    pub async fn as_json(&self, options: &JsonOptions<'_>) -> StoreResult<Vec<Value>> {
        let mut rendered = Vec::new();
        for entity in self.fetch().await? {
            rendered.push(entity.as_json(options).await?);
        }
        Ok(rendered)
    }
}

/// Type-erased collection, for dispatch where the concrete model is not known at compile time.
pub trait AnyCollection: Send + Sync + Debug {
    /// Returns the model name of the members.
    fn entity_name(&self) -> &'static str;

    /// Returns the collection path.
    fn collection_path(&self) -> String;

    /// A new collection with the filter replaced.
    fn filter_any(&self, condition: WhereCondition) -> Box<dyn AnyCollection>;

    /// A new collection with the ordering replaced.
    fn order_any(&self, condition: OrderCondition) -> Box<dyn AnyCollection>;

    /// A new collection with the cap replaced.
    fn limit_any(&self, limit: usize) -> Box<dyn AnyCollection>;

    /// Runs the query once.
    fn fetch_any(&self) -> BoxFuture<'_, StoreResult<Vec<Box<dyn AnyModel>>>>;

    /// The first result.
    fn first_any(&self) -> BoxFuture<'_, StoreResult<Option<Box<dyn AnyModel>>>>;

    /// The number of matching documents.
    fn count_any(&self) -> BoxFuture<'_, StoreResult<usize>>;

    /// Renders every result as plain JSON.
    fn json_any(&self, recursive: bool) -> BoxFuture<'_, StoreResult<Vec<Value>>>;

    /// Returns a reference to the collection as a generic `Any` type.
    fn as_any(&self) -> &dyn Any;

    /// Clones the collection into a new box.
    fn clone_box(&self) -> Box<dyn AnyCollection>;
}

impl dyn AnyCollection {
    /// Attempts to downcast to the collection of a specific model.
    pub fn downcast_ref<M: Model>(&self) -> Option<&Collection<M>> {
        self.as_any().downcast_ref::<Collection<M>>()
    }
}

impl<M: Model> AnyCollection for Collection<M> {
    fn entity_name(&self) -> &'static str {
        M::model_name()
    }

    fn collection_path(&self) -> String {
        self.path()
    }

    fn filter_any(&self, condition: WhereCondition) -> Box<dyn AnyCollection> {
        Box::new(self.with_filter(condition))
    }

    fn order_any(&self, condition: OrderCondition) -> Box<dyn AnyCollection> {
        Box::new(self.with_order(condition))
    }

    fn limit_any(&self, limit: usize) -> Box<dyn AnyCollection> {
        Box::new(self.limit(limit))
    }

    fn fetch_any(&self) -> BoxFuture<'_, StoreResult<Vec<Box<dyn AnyModel>>>> {
        Box::pin(async move {
            Ok(self
                .fetch()
                .await?
                .into_iter()
                .map(|entity| Box::new(entity) as Box<dyn AnyModel>)
                .collect())
        })
    }

    fn first_any(&self) -> BoxFuture<'_, StoreResult<Option<Box<dyn AnyModel>>>> {
        Box::pin(async move {
            Ok(self
                .first()
                .await?
                .map(|entity| Box::new(entity) as Box<dyn AnyModel>))
        })
    }

    fn count_any(&self) -> BoxFuture<'_, StoreResult<usize>> {
        Box::pin(self.count())
    }

    fn json_any(&self, recursive: bool) -> BoxFuture<'_, StoreResult<Vec<Value>>> {
        Box::pin(async move {
            self.as_json(&JsonOptions::new().recursive(recursive))
                .await
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn AnyCollection> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn AnyCollection> {
    fn clone(&self) -> Box<dyn AnyCollection> {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{StoreBackend, StoredDocument},
        connection::Connection,
        model::DocMeta,
    };
    use bson::Document;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Note {
        #[serde(default)]
        id: Option<String>,
        body: String,
        #[serde(skip)]
        meta: DocMeta,
    }

    impl Model for Note {
        fn model_name() -> &'static str {
            "Note"
        }

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn set_id(&mut self, id: Option<String>) {
            self.id = id;
        }

        fn meta(&self) -> &DocMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut DocMeta {
            &mut self.meta
        }
    }

    /// Accepts every write but never hands an id back.
    #[derive(Debug)]
    struct SilentStore;

    #[async_trait::async_trait]
    impl StoreBackend for SilentStore {
        async fn get_document(&self, _: &str, _: &str) -> StoreResult<Option<Document>> {
            Ok(None)
        }

        async fn query_documents(&self, _: &str, _: &Query) -> StoreResult<Vec<StoredDocument>> {
            Ok(Vec::new())
        }

        async fn create_document(&self, _: &str, _: Document) -> StoreResult<Option<String>> {
            Ok(None)
        }

        async fn set_document(&self, _: &str, _: &str, _: Document) -> StoreResult<Option<String>> {
            Ok(None)
        }

        async fn delete_document(&self, _: &str, _: &str) -> StoreResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn writes_without_a_returned_id_fail() {
        let _guard = Connection::override_with(SilentStore);

        let mut note = Note {
            body: "draft".to_string(),
            ..Default::default()
        };
        assert!(matches!(note.save().await, Err(StoreError::SaveFailure(_))));
        assert_eq!(note.id(), None);

        assert!(matches!(
            Collection::<Note>::nested("books/b1").add(&mut note).await,
            Err(StoreError::SaveFailure(_))
        ));
        assert_eq!(note.id(), None);

        let mut existing = Note {
            id: Some("n1".to_string()),
            body: "kept".to_string(),
            ..Default::default()
        };
        assert!(matches!(existing.save().await, Err(StoreError::SaveFailure(_))));
        assert_eq!(existing.id(), Some("n1"));
    }

    #[test]
    fn composing_never_mutates_the_receiver() {
        let base = Collection::<Note>::new();
        let filtered = base.filter("body", FieldOp::Eq, "hello");
        let ordered = filtered
            .order("body", "DESCENDING")
            .unwrap();

        assert_eq!(base.query(), &Query::new());
        assert!(filtered.query().order.is_none());
        assert_eq!(ordered.query().filter, filtered.query().filter);
        assert_eq!(
            ordered.query().order,
            Some(OrderCondition::new("body", OrderDirection::Descending))
        );
    }

    #[test]
    fn rejects_unknown_directions() {
        assert!(matches!(
            Collection::<Note>::new().order("body", "UPWARDS"),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            Collection::<Note>::new().order("body", "descending"),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn resolves_paths() {
        assert_eq!(Collection::<Note>::new().path(), "notes");
        assert_eq!(
            Collection::<Note>::nested("books/b1").path(),
            "books/b1/notes"
        );
    }

    #[test]
    fn downcasts_erased_collections() {
        let erased: Box<dyn AnyCollection> = Box::new(Collection::<Note>::new().limit(3));

        assert_eq!(erased.entity_name(), "Note");
        assert_eq!(
            erased
                .downcast_ref::<Note>()
                .map(|c| c.query().limit),
            Some(3)
        );
    }
}
