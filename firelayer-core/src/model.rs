//! Core traits and types for entities mapped onto hierarchical document paths.
//!
//! An entity type implements [`Model`], usually through `#[derive(Model)]`, and gets
//! its operations from the blanket [`ModelExt`] extension trait:
//!
//! ```ignore
//! use firelayer::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Model)]
//! pub struct Book {
//!     #[serde(default)]
//!     pub id: Option<String>,
//!     pub title: String,
//!     #[serde(skip)]
//!     pub tags: SubCollection<Tag>,
//!     #[serde(skip)]
//!     meta: DocMeta,
//! }
//!
//! let mut book = Book { title: "Math".into(), ..Default::default() };
//! book.save().await?;
//! let again = Book::find(book.id().unwrap()).await?;
//! ```

use async_trait::async_trait;
use bson::{Bson, Document, de::deserialize_from_document, ser::serialize_to_document};
use futures::{future::BoxFuture, stream::BoxStream};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::Value;
use std::{any::Any, fmt::Debug, marker::PhantomData};

use crate::{
    collection::Collection,
    error::{StoreError, StoreResult},
    inflect::tableize,
    json::{JsonOptions, bson_to_json},
    path::{self, parent_document, split_document_path},
    primitives::{ID_KEY, QueryRunner},
    query::{FieldOp, OrderDirection},
    relation::Related,
};

/// The canonical wire representation of timestamps.
pub type Timestamp = bson::DateTime;

/// Per-instance location metadata.
///
/// `parent` is the document path of the owning entity for subcollection members. It
/// is a plain path, never a handle to the owner. `path` is the full document path the
/// entity was loaded by, and wins over any computed path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocMeta {
    parent: Option<String>,
    path: Option<String>,
}

impl DocMeta {
    /// The document path of the owning entity, if this entity lives in a subcollection.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The full document path recorded when the entity was loaded by path.
    pub fn override_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<String>) {
        self.parent = parent;
    }

    pub(crate) fn set_override_path(&mut self, path: Option<String>) {
        self.path = path;
    }
}

/// How a declared field is stored.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Stored inline in the document.
    Value,
    /// A nested collection under the entity's document path, never stored inline.
    SubCollection(SubCollectionField),
}

/// Type-erased description of a subcollection field.
#[derive(Clone, Copy)]
pub struct SubCollectionField {
    /// Returns the member model name.
    pub model: fn() -> &'static str,
    /// Returns the leaf collection name under the owner's document path.
    pub leaf: fn() -> String,
    /// Renders every member under the given owner document path.
    pub dump: fn(String, bool) -> BoxFuture<'static, StoreResult<Vec<Value>>>,
}

impl Debug for SubCollectionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubCollectionField")
            .field("model", &(self.model)())
            .field("leaf", &(self.leaf)())
            .finish()
    }
}

/// One entry of a model's static field table.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// The serialized field name.
    pub name: &'static str,
    /// How the field is stored.
    pub kind: FieldKind,
}

impl Field {
    /// A field stored inline.
    pub const fn value(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Value,
        }
    }

    /// A subcollection field whose members are `T`.
    pub fn subcollection<T: Model>(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::SubCollection(SubCollectionField {
                model: T::model_name,
                leaf: T::collection_name,
                dump: dump_subcollection::<T>,
            }),
        }
    }

    /// Returns the subcollection description, if this is a subcollection field.
    pub fn as_subcollection(&self) -> Option<&SubCollectionField> {
        match &self.kind {
            FieldKind::SubCollection(sub) => Some(sub),
            FieldKind::Value => None,
        }
    }
}

fn dump_subcollection<T: Model>(
    owner: String,
    recursive: bool,
) -> BoxFuture<'static, StoreResult<Vec<Value>>> {
    Box::pin(async move {
        Collection::<T>::nested(owner)
            .as_json(&JsonOptions::new().recursive(recursive))
            .await
    })
}

/// Core trait that every entity type implements.
///
/// The methods are the static per-type table consulted by serialization, loading and
/// path resolution. `#[derive(Model)]` generates all of them.
pub trait Model:
    Serialize + DeserializeOwned + Send + Sync + Clone + Debug + 'static
{
    /// Returns the type name of the model, used for relationship lookup.
    fn model_name() -> &'static str;

    /// Returns the top-level collection name (or leaf name when nested).
    ///
    /// Defaults to the tableized model name: `AdminUser` becomes `admin_users`.
    fn collection_name() -> String {
        tableize(Self::model_name())
    }

    /// Returns the declared fields, including subcollection fields.
    fn fields() -> Vec<Field> {
        Vec::new()
    }

    /// Returns the id, or `None` until persisted.
    fn id(&self) -> Option<&str>;

    /// Sets the id.
    fn set_id(&mut self, id: Option<String>);

    /// Returns the location metadata.
    fn meta(&self) -> &DocMeta;

    /// Returns the location metadata mutably.
    fn meta_mut(&mut self) -> &mut DocMeta;

    /// Binds every subcollection field to the entity's document path.
    fn bind_subcollections(&mut self, _path: &str) {}
}

fn subcollection_names<M: Model>() -> Vec<&'static str> {
    M::fields()
        .into_iter()
        .filter(|field| field.as_subcollection().is_some())
        .map(|field| field.name)
        .collect()
}

/// Turns a read mapping into an entity located under `parent`.
pub(crate) fn materialize<M: Model>(
    mut fields: Document,
    parent: Option<String>,
    override_path: Option<String>,
) -> StoreResult<M> {
    for name in subcollection_names::<M>() {
        fields.remove(name);
    }

    let id = fields.get_str(ID_KEY).ok().map(str::to_string);
    let mut entity: M = deserialize_from_document(fields)?;
    entity.set_id(id);
    entity.meta_mut().set_parent(parent);
    entity.meta_mut().set_override_path(override_path);

    if let Ok(path) = entity.path() {
        entity.bind_subcollections(&path);
    }

    Ok(entity)
}

/// Reads a foreign-key value; null, missing and empty values yield `None`.
pub(crate) fn foreign_key_value(fields: &Document, key: &str) -> Option<String> {
    match fields.get(key)? {
        Bson::String(s) if !s.is_empty() => Some(s.clone()),
        Bson::Int32(i) if *i != 0 => Some(i.to_string()),
        Bson::Int64(i) if *i != 0 => Some(i.to_string()),
        Bson::Document(reference) => reference
            .get_str("path")
            .ok()
            .filter(|p| !p.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Extension trait providing the entity operations.
///
/// This trait is automatically implemented for all types that implement [`Model`].
#[async_trait]
pub trait ModelExt: Model {
    /// Loads an entity by bare id (in the type's top-level collection) or by full
    /// document path such as `books/b1/tags/t1`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if the document does not exist and
    /// [`StoreError::InvalidArgument`] for a malformed path.
    async fn find(path_or_id: &str) -> StoreResult<Self>;

    /// Like [`find`](ModelExt::find), but a missing document yields an unsaved
    /// placeholder carrying only the requested id.
    async fn find_or_empty(path_or_id: &str) -> StoreResult<Self>
    where
        Self: Default;

    /// Returns `true` iff [`find`](ModelExt::find) would succeed.
    async fn exists(path_or_id: &str) -> StoreResult<bool>;

    /// A top-level collection filtered by one predicate.
    fn filter(field: impl Into<String>, op: FieldOp, value: impl Into<Bson>) -> Collection<Self> {
        Collection::new().filter(field, op, value)
    }

    /// A top-level collection ordered by `field`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] unless `direction` is `ASCENDING` or `DESCENDING`.
    fn order(field: impl Into<String>, direction: &str) -> StoreResult<Collection<Self>> {
        Collection::new().order(field, direction)
    }

    /// A top-level collection ordered by `field` in `direction`.
    fn order_by(field: impl Into<String>, direction: OrderDirection) -> Collection<Self> {
        Collection::new().order_by(field, direction)
    }

    /// The unfiltered top-level collection.
    fn all() -> Collection<Self> {
        Collection::new()
    }

    /// The first entity of the top-level collection.
    async fn first() -> StoreResult<Option<Self>>;

    /// The number of entities in the top-level collection.
    async fn count() -> StoreResult<usize>;

    /// Creates the document when the entity has no id, otherwise overwrites it.
    ///
    /// # Returns
    ///
    /// Returns the id, which is also written back to the entity.
    async fn save(&mut self) -> StoreResult<String>;

    /// Saves the entity and hands it back.
    async fn persist(self) -> StoreResult<Self>;

    /// Applies `apply` to the entity, then saves it.
    async fn update<F>(&mut self, apply: F) -> StoreResult<String>
    where
        F: FnOnce(&mut Self) + Send;

    /// Removes the document, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] if the entity was never saved.
    async fn delete(&self) -> StoreResult<bool>;

    /// Returns the document path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] if the entity has neither an id nor an
    /// override path.
    fn path(&self) -> StoreResult<String> {
        if let Some(path) = self.meta().override_path() {
            return Ok(path.to_string());
        }

        match self.id() {
            Some(id) => Ok(path::document_path(&self.collection_path(), id)),
            None => Err(StoreError::InvalidState(format!(
                "{} has no id; its document path is undefined until saved",
                Self::model_name()
            ))),
        }
    }

    /// Returns the path of the collection holding this entity.
    fn collection_path(&self) -> String {
        if let Some((collection, _)) = self
            .meta()
            .override_path()
            .and_then(|p| split_document_path(p).ok())
        {
            return collection.to_string();
        }

        path::collection_path(self.meta().parent(), &Self::collection_name())
    }

    /// Serializes the declared fields, without the id and subcollections.
    fn to_document(&self) -> StoreResult<Document> {
        let mut document = serialize_to_document(self)?;
        document.remove(ID_KEY);
        for name in subcollection_names::<Self>() {
            document.remove(name);
        }
        Ok(document)
    }

    /// Renders the entity as plain JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AttributeNotFound`] if an `include` name resolves to nothing.
    async fn as_json(&self, options: &JsonOptions<'_>) -> StoreResult<Value>;

    /// The subcollection of `T` nested under this entity.
    fn subcollection<T: Model>(&self) -> StoreResult<Collection<T>> {
        Ok(Collection::nested(self.path()?))
    }

    /// Looks up the `T` whose id is stored in `foreign_key`.
    async fn belongs_to<T: Model>(&self, foreign_key: &str) -> StoreResult<Option<T>>;

    /// The first `T` whose `foreign_key` equals this entity's id.
    async fn has_one<T: Model>(&self, foreign_key: &str) -> StoreResult<Option<T>>;

    /// Every `T` whose `foreign_key` equals this entity's id, as a lazy collection.
    fn has_many<T: Model>(&self, foreign_key: &str) -> StoreResult<Collection<T>> {
        let id = self.id().ok_or_else(|| {
            StoreError::InvalidState(format!(
                "{} must be saved before querying {}",
                Self::model_name(),
                T::model_name()
            ))
        })?;

        Ok(T::filter(foreign_key, FieldOp::Eq, id))
    }
}

#[async_trait]
impl<M: Model> ModelExt for M {
    async fn find(path_or_id: &str) -> StoreResult<Self> {
        if !path_or_id.contains('/') {
            let fields = QueryRunner::new(Self::collection_name())?
                .get(path_or_id)
                .await?;
            return materialize(fields, None, None);
        }

        let (collection, id) = split_document_path(path_or_id)?;
        let fields = QueryRunner::new(collection)?.get(id).await?;

        materialize(
            fields,
            parent_document(collection).map(str::to_string),
            Some(path_or_id.to_string()),
        )
    }

    async fn find_or_empty(path_or_id: &str) -> StoreResult<Self>
    where
        Self: Default,
    {
        match Self::find(path_or_id).await {
            Err(err) if err.is_not_found() => {
                let mut placeholder = Self::default();
                match path_or_id.rsplit_once('/') {
                    Some((collection, id)) => {
                        placeholder.set_id(Some(id.to_string()));
                        placeholder
                            .meta_mut()
                            .set_parent(parent_document(collection).map(str::to_string));
                        placeholder
                            .meta_mut()
                            .set_override_path(Some(path_or_id.to_string()));
                    }
                    None => placeholder.set_id(Some(path_or_id.to_string())),
                }
                Ok(placeholder)
            }
            other => other,
        }
    }

    async fn exists(path_or_id: &str) -> StoreResult<bool> {
        match Self::find(path_or_id).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn first() -> StoreResult<Option<Self>> {
        Self::all().first().await
    }

    async fn count() -> StoreResult<usize> {
        Self::all().count().await
    }

    async fn save(&mut self) -> StoreResult<String> {
        let data = self.to_document()?;
        let runner = QueryRunner::new(self.collection_path())?;
        let existing = self.id().map(str::to_string);

        let id = match existing {
            Some(id) => runner.save(&id, data).await?,
            None => runner.create(data).await?,
        };

        self.set_id(Some(id.clone()));
        let path = self.path()?;
        self.bind_subcollections(&path);

        Ok(id)
    }

    async fn persist(mut self) -> StoreResult<Self> {
        self.save().await?;
        Ok(self)
    }

    async fn update<F>(&mut self, apply: F) -> StoreResult<String>
    where
        F: FnOnce(&mut Self) + Send,
    {
        apply(self);
        self.save().await
    }

    async fn delete(&self) -> StoreResult<bool> {
        let id = self.id().ok_or_else(|| {
            StoreError::InvalidState(format!("cannot delete an unsaved {}", Self::model_name()))
        })?;

        QueryRunner::new(self.collection_path())?
            .delete(id)
            .await
    }

    async fn as_json(&self, options: &JsonOptions<'_>) -> StoreResult<Value> {
        let fields = self.to_document()?;
        let mut rendered = serde_json::Map::new();

        rendered.insert(
            ID_KEY.to_string(),
            self.id()
                .map_or(Value::Null, |id| Value::String(id.to_string())),
        );
        for (key, value) in fields.iter() {
            rendered.insert(key.clone(), bson_to_json(value.clone()));
        }
        for name in &options.excepts {
            rendered.remove(name);
        }

        let declared = Self::fields();

        if options.recursive {
            for field in &declared {
                let Some(sub) = field.as_subcollection() else {
                    continue;
                };
                if options.is_excepted(field.name) {
                    continue;
                }
                let items = match self.path() {
                    Ok(path) => (sub.dump)(path, true).await?,
                    Err(_) => Vec::new(),
                };
                rendered.insert(field.name.to_string(), Value::Array(items));
            }
        }

        for name in &options.include {
            if name == ID_KEY {
                rendered.insert(
                    name.clone(),
                    self.id()
                        .map_or(Value::Null, |id| Value::String(id.to_string())),
                );
                continue;
            }

            if let Some(value) = fields.get(name) {
                rendered.insert(name.clone(), bson_to_json(value.clone()));
                continue;
            }

            if let Some(sub) = declared
                .iter()
                .find(|field| field.name == name.as_str())
                .and_then(Field::as_subcollection)
            {
                let items = match self.path() {
                    Ok(path) => (sub.dump)(path, options.recursive).await?,
                    Err(_) => Vec::new(),
                };
                rendered.insert(name.clone(), Value::Array(items));
                continue;
            }

            let Some(registry) = options.registry else {
                return Err(StoreError::AttributeNotFound(
                    Self::model_name().to_string(),
                    name.clone(),
                ));
            };

            if registry
                .relation(Self::model_name(), name)
                .is_some()
            {
                let nested = options.nested().recursive(false);
                let value = match registry.related(self, name).await? {
                    Related::One(Some(entity)) => entity.entity_json(&nested).await?,
                    Related::One(None) => Value::Null,
                    Related::Many(collection) => {
                        Value::Array(collection.json_any(options.recursive).await?)
                    }
                };
                rendered.insert(name.clone(), value);
                continue;
            }

            match registry.computed_value(self, name) {
                Some(value) => {
                    rendered.insert(name.clone(), value?);
                }
                None => {
                    return Err(StoreError::AttributeNotFound(
                        Self::model_name().to_string(),
                        name.clone(),
                    ));
                }
            }
        }

        Ok(Value::Object(rendered))
    }

    async fn belongs_to<T: Model>(&self, foreign_key: &str) -> StoreResult<Option<T>> {
        let fields = self.to_document()?;

        match foreign_key_value(&fields, foreign_key) {
            Some(id) => Ok(Some(T::find(&id).await?)),
            None => Ok(None),
        }
    }

    async fn has_one<T: Model>(&self, foreign_key: &str) -> StoreResult<Option<T>> {
        self.has_many::<T>(foreign_key)?
            .first()
            .await
    }
}

/// A stored path string pointing at another entity.
///
/// References are never dereferenced implicitly; call [`DocumentRef::get`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    /// Creates a reference to the document at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a reference to a saved entity.
    pub fn to<M: Model>(entity: &M) -> StoreResult<Self> {
        Ok(Self::new(entity.path()?))
    }

    /// The referenced document path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Loads the referenced entity.
    pub async fn get<M: Model>(&self) -> StoreResult<M> {
        M::find(&self.path).await
    }
}

impl Serialize for DocumentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path)
    }
}

impl<'de> Deserialize<'de> for DocumentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Path(String),
            Mapping { path: String },
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Path(path) | Shape::Mapping { path } => DocumentRef { path },
        })
    }
}

/// A typed subcollection field.
///
/// Declare it with `#[serde(skip)]`; it is bound to the owner's document path whenever
/// the owner is loaded, created or saved.
pub struct SubCollection<T> {
    owner: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for SubCollection<T> {
    fn default() -> Self {
        Self {
            owner: None,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for SubCollection<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for SubCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubCollection")
            .field("owner", &self.owner)
            .finish()
    }
}

impl<T> PartialEq for SubCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
    }
}

impl<T: Model> SubCollection<T> {
    /// Binds the field to its owner's document path.
    pub fn bind(&mut self, owner: &str) {
        self.owner = Some(owner.to_string());
    }

    /// The owner's document path, once bound.
    pub fn owner_path(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The collection path of the members.
    pub fn path(&self) -> StoreResult<String> {
        Ok(self.collection()?.path())
    }

    /// The lazy collection of members.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] while the owner is unsaved.
    pub fn collection(&self) -> StoreResult<Collection<T>> {
        self.owner
            .as_ref()
            .map(|owner| Collection::nested(owner.clone()))
            .ok_or_else(|| {
                StoreError::InvalidState(format!(
                    "the {} subcollection has no saved owner",
                    T::collection_name()
                ))
            })
    }

    /// Creates `entity` as a member, returning its new id.
    pub async fn add(&self, entity: &mut T) -> StoreResult<String> {
        self.collection()?.add(entity).await
    }

    /// Loads every member.
    pub async fn fetch(&self) -> StoreResult<Vec<T>> {
        self.collection()?.fetch().await
    }

    /// Loads the first member.
    pub async fn first(&self) -> StoreResult<Option<T>> {
        self.collection()?.first().await
    }

    /// Streams the members, reading on first poll.
    pub fn stream(&self) -> StoreResult<BoxStream<'static, StoreResult<T>>> {
        Ok(self.collection()?.stream())
    }
}

/// Type-erased entity, for dispatch where the concrete model is not known at compile time.
pub trait AnyModel: Send + Sync + Debug {
    /// Returns the model name.
    fn entity_name(&self) -> &'static str;

    /// Returns the id, if saved.
    fn entity_id(&self) -> Option<&str>;

    /// Returns the document path.
    fn entity_path(&self) -> StoreResult<String>;

    /// Serializes the declared fields.
    fn entity_fields(&self) -> StoreResult<Document>;

    /// Renders the entity as plain JSON.
    fn entity_json<'a>(&'a self, options: &'a JsonOptions<'a>) -> BoxFuture<'a, StoreResult<Value>>;

    /// Returns a reference to the entity as a generic `Any` type.
    fn as_any(&self) -> &dyn Any;

    /// Clones the entity into a new box.
    fn clone_box(&self) -> Box<dyn AnyModel>;
}

impl<'a> dyn AnyModel + 'a {
    /// Attempts to downcast a reference to a specific model type.
    pub fn downcast_ref<M: Model>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }
}

impl<M: Model> AnyModel for M {
    fn entity_name(&self) -> &'static str {
        M::model_name()
    }

    fn entity_id(&self) -> Option<&str> {
        self.id()
    }

    fn entity_path(&self) -> StoreResult<String> {
        self.path()
    }

    fn entity_fields(&self) -> StoreResult<Document> {
        self.to_document()
    }

    fn entity_json<'a>(&'a self, options: &'a JsonOptions<'a>) -> BoxFuture<'a, StoreResult<Value>> {
        ModelExt::as_json(self, options)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn AnyModel> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn AnyModel> {
    fn clone(&self) -> Box<dyn AnyModel> {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn foreign_keys_skip_falsy_values() {
        let fields = doc! {
            "user_id": "u1",
            "empty": "",
            "nothing": Bson::Null,
            "owner": { "path": "users/u2" },
            "number": 7,
        };

        assert_eq!(foreign_key_value(&fields, "user_id"), Some("u1".to_string()));
        assert_eq!(foreign_key_value(&fields, "empty"), None);
        assert_eq!(foreign_key_value(&fields, "nothing"), None);
        assert_eq!(foreign_key_value(&fields, "missing"), None);
        assert_eq!(foreign_key_value(&fields, "owner"), Some("users/u2".to_string()));
        assert_eq!(foreign_key_value(&fields, "number"), Some("7".to_string()));
    }

    #[test]
    fn document_refs_accept_both_shapes() {
        let from_string: DocumentRef = serde_json::from_value(serde_json::json!("users/u1")).unwrap();
        let from_mapping: DocumentRef =
            serde_json::from_value(serde_json::json!({ "path": "users/u1" })).unwrap();

        assert_eq!(from_string, from_mapping);
        assert_eq!(
            serde_json::to_value(&from_string).unwrap(),
            serde_json::json!("users/u1")
        );
    }

    #[test]
    fn doc_meta_defaults_to_top_level() {
        let meta = DocMeta::default();
        assert_eq!(meta.parent(), None);
        assert_eq!(meta.override_path(), None);
    }
}
