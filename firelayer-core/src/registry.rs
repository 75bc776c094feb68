//! The relationship registry.
//!
//! Relationships are registered in two phases. Declarations naming an already known
//! type apply immediately ([`Registry::belongs_to`], [`Registry::has_one`],
//! [`Registry::has_many`]). Declarations naming a type by string are queued
//! ([`Registry::declare`]) and applied by a single [`Registry::resolve`] pass once
//! every model has been registered. The queue belongs to the registry value, so
//! independent schemas never share state.
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry
//!     .register::<User>()
//!     .declare::<Book>(RelationKind::BelongsTo, "User", "user_id", None)
//!     .declare::<User>(RelationKind::HasMany, "Book", "user_id", None);
//! let unresolved = registry.resolve();
//! assert!(unresolved.is_empty());
//!
//! let owner = registry.related_one::<User>(&book, "user").await?;
//! ```

use serde_json::Value;
use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
    sync::Arc,
};
use tracing::{debug, warn};

use crate::{
    collection::Collection,
    error::{StoreError, StoreResult},
    model::{AnyModel, Model, foreign_key_value},
    query::{FieldOp, WhereCondition},
    relation::{ModelInfo, PendingRelation, Related, Relation, RelationKind},
};

type ComputedFn = Arc<dyn Fn(&dyn AnyModel) -> StoreResult<Value> + Send + Sync>;

/// Registered models, their relationships and computed accessors.
#[derive(Default, Clone)]
pub struct Registry {
    models: BTreeMap<&'static str, Arc<ModelInfo>>,
    relations: BTreeMap<&'static str, Vec<Relation>>,
    pending: Vec<PendingRelation>,
    computed: BTreeMap<&'static str, BTreeMap<String, ComputedFn>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `M` by name. Registering twice is a no-op.
    pub fn register<M: Model>(&mut self) -> &mut Self {
        self.info::<M>();
        self
    }

    fn info<M: Model>(&mut self) -> Arc<ModelInfo> {
        self.models
            .entry(M::model_name())
            .or_insert_with(|| Arc::new(ModelInfo::of::<M>()))
            .clone()
    }

    /// Returns the registered model called `name`.
    pub fn model(&self, name: &str) -> Option<&Arc<ModelInfo>> {
        self.models.get(name)
    }

    /// Returns every registered model, ordered by name.
    pub fn models(&self) -> impl Iterator<Item = &Arc<ModelInfo>> {
        self.models.values()
    }

    /// Declares that `M` belongs to `T` through `M`'s `foreign_key` field.
    pub fn belongs_to<M: Model, T: Model>(
        &mut self,
        foreign_key: &str,
        accessor: Option<&str>,
    ) -> &mut Self {
        self.attach::<M, T>(RelationKind::BelongsTo, foreign_key, accessor)
    }

    /// Declares that `M` has one `T` through `T`'s `foreign_key` field.
    pub fn has_one<M: Model, T: Model>(
        &mut self,
        foreign_key: &str,
        accessor: Option<&str>,
    ) -> &mut Self {
        self.attach::<M, T>(RelationKind::HasOne, foreign_key, accessor)
    }

    /// Declares that `M` has many `T` through `T`'s `foreign_key` field.
    pub fn has_many<M: Model, T: Model>(
        &mut self,
        foreign_key: &str,
        accessor: Option<&str>,
    ) -> &mut Self {
        self.attach::<M, T>(RelationKind::HasMany, foreign_key, accessor)
    }

    fn attach<M: Model, T: Model>(
        &mut self,
        kind: RelationKind,
        foreign_key: &str,
        accessor: Option<&str>,
    ) -> &mut Self {
        self.register::<M>();
        let target = self.info::<T>();

        self.push_relation(
            M::model_name(),
            Relation {
                kind,
                accessor: accessor
                    .map(str::to_string)
                    .unwrap_or_else(|| kind.default_accessor(T::model_name())),
                foreign_key: foreign_key.to_string(),
                target,
            },
        );
        self
    }

    fn push_relation(&mut self, declaring: &'static str, relation: Relation) {
        let relations = self.relations.entry(declaring).or_default();
        relations.retain(|existing| existing.accessor != relation.accessor);
        relations.push(relation);
    }

    /// Queues a relationship whose target is named rather than typed.
    pub fn declare<M: Model>(
        &mut self,
        kind: RelationKind,
        target: &str,
        foreign_key: &str,
        accessor: Option<&str>,
    ) -> &mut Self {
        self.register::<M>();
        self.pending.push(PendingRelation {
            declaring: M::model_name(),
            kind,
            target: target.to_string(),
            foreign_key: foreign_key.to_string(),
            accessor: accessor.map(str::to_string),
        });
        self
    }

    /// The queued, not yet resolved, relationships.
    pub fn pending(&self) -> &[PendingRelation] {
        &self.pending
    }

    /// Walks the queue once against the registered models and clears it.
    ///
    /// # Returns
    ///
    /// Returns the entries whose target was not registered. They are dropped from
    /// the queue.
    pub fn resolve(&mut self) -> Vec<PendingRelation> {
        let pending = std::mem::take(&mut self.pending);
        let mut unresolved = Vec::new();

        for entry in pending {
            let Some(target) = self.models.get(entry.target.as_str()).cloned() else {
                warn!(
                    declaring = entry.declaring,
                    kind = %entry.kind,
                    target = %entry.target,
                    "dropping relationship to unregistered model"
                );
                unresolved.push(entry);
                continue;
            };

            debug!(
                declaring = entry.declaring,
                kind = %entry.kind,
                target = %entry.target,
                "resolved relationship"
            );
            let accessor = entry
                .accessor
                .clone()
                .unwrap_or_else(|| entry.kind.default_accessor(&entry.target));
            self.push_relation(
                entry.declaring,
                Relation {
                    kind: entry.kind,
                    accessor,
                    foreign_key: entry.foreign_key,
                    target,
                },
            );
        }

        unresolved
    }

    /// The relationships declared by `model`.
    pub fn relations_of(&self, model: &str) -> &[Relation] {
        self.relations
            .get(model)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The relationship of `model` exposed under `accessor`.
    pub fn relation(&self, model: &str, accessor: &str) -> Option<&Relation> {
        self.relations_of(model)
            .iter()
            .find(|relation| relation.accessor == accessor)
    }

    /// Registers a zero-argument computed accessor on `M`, usable from `include`.
    pub fn computed<M, F>(&mut self, name: &str, accessor: F) -> &mut Self
    where
        M: Model,
        F: Fn(&M) -> StoreResult<Value> + Send + Sync + 'static,
    {
        self.register::<M>();

        let erased: ComputedFn = Arc::new(move |entity: &dyn AnyModel| {
            match entity.downcast_ref::<M>() {
                Some(entity) => accessor(entity),
                None => Err(StoreError::TypeMismatch {
                    expected: M::model_name().to_string(),
                    found: entity.entity_name().to_string(),
                }),
            }
        });

        self.computed
            .entry(M::model_name())
            .or_default()
            .insert(name.to_string(), erased);
        self
    }

    /// Evaluates the computed accessor `name` on `entity`, if one is registered.
    pub fn computed_value(&self, entity: &dyn AnyModel, name: &str) -> Option<StoreResult<Value>> {
        self.computed
            .get(entity.entity_name())
            .and_then(|accessors| accessors.get(name))
            .map(|accessor| accessor(entity))
    }

    /// Evaluates the relationship accessor `name` on `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AttributeNotFound`] if no such accessor exists and
    /// [`StoreError::InvalidState`] for has-one/has-many on an unsaved entity.
    pub async fn related(&self, entity: &dyn AnyModel, name: &str) -> StoreResult<Related> {
        let relation = self
            .relation(entity.entity_name(), name)
            .ok_or_else(|| {
                StoreError::AttributeNotFound(entity.entity_name().to_string(), name.to_string())
            })?;

        if relation.kind == RelationKind::BelongsTo {
            let fields = entity.entity_fields()?;
            return match foreign_key_value(&fields, &relation.foreign_key) {
                Some(key) => Ok(Related::One(Some(relation.target.find(&key).await?))),
                None => Ok(Related::One(None)),
            };
        }

        let id = entity.entity_id().ok_or_else(|| {
            StoreError::InvalidState(format!(
                "{} must be saved before reading {name}",
                entity.entity_name()
            ))
        })?;
        let scoped = relation
            .target
            .collection()
            .filter_any(WhereCondition::new(
                relation.foreign_key.as_str(),
                FieldOp::Eq,
                id,
            ));

        match relation.kind {
            RelationKind::HasMany => Ok(Related::Many(scoped)),
            _ => Ok(Related::One(scoped.first_any().await?)),
        }
    }

    /// Evaluates a belongs-to or has-one accessor and downcasts the result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TypeMismatch`] if the accessor yields a collection or
    /// another model.
    pub async fn related_one<T: Model>(
        &self,
        entity: &dyn AnyModel,
        name: &str,
    ) -> StoreResult<Option<T>> {
        match self.related(entity, name).await? {
            Related::One(None) => Ok(None),
            Related::One(Some(found)) => found
                .downcast_ref::<T>()
                .cloned()
                .map(Some)
                .ok_or_else(|| StoreError::TypeMismatch {
                    expected: T::model_name().to_string(),
                    found: found.entity_name().to_string(),
                }),
            Related::Many(collection) => Err(StoreError::TypeMismatch {
                expected: T::model_name().to_string(),
                found: format!("collection of {}", collection.entity_name()),
            }),
        }
    }

    /// Evaluates a has-many accessor and downcasts the collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TypeMismatch`] if the accessor yields a single entity or
    /// a collection of another model.
    pub async fn related_many<T: Model>(
        &self,
        entity: &dyn AnyModel,
        name: &str,
    ) -> StoreResult<Collection<T>> {
        match self.related(entity, name).await? {
            Related::Many(collection) => collection
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| StoreError::TypeMismatch {
                    expected: format!("collection of {}", T::model_name()),
                    found: format!("collection of {}", collection.entity_name()),
                }),
            Related::One(_) => Err(StoreError::TypeMismatch {
                expected: format!("collection of {}", T::model_name()),
                found: "a single entity".to_string(),
            }),
        }
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .field("relations", &self.relations)
            .field("pending", &self.pending)
            .field(
                "computed",
                &self
                    .computed
                    .iter()
                    .map(|(model, accessors)| (model, accessors.keys().collect::<Vec<_>>()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocMeta;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    macro_rules! test_model {
        ($ty:ident) => {
            #[derive(Debug, Clone, Default, Serialize, Deserialize)]
            struct $ty {
                #[serde(default)]
                id: Option<String>,
                #[serde(default)]
                owner_id: String,
                #[serde(skip)]
                meta: DocMeta,
            }

            impl Model for $ty {
                fn model_name() -> &'static str {
                    stringify!($ty)
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
        };
    }

    test_model!(Author);
    test_model!(Post);

    #[test]
    fn typed_declarations_apply_immediately() {
        let mut registry = Registry::new();
        registry
            .belongs_to::<Post, Author>("owner_id", None)
            .has_many::<Author, Post>("owner_id", Some("writings"));

        assert!(registry.pending().is_empty());
        assert_eq!(
            registry
                .relation("Post", "author")
                .map(|r| r.kind),
            Some(RelationKind::BelongsTo)
        );
        assert_eq!(
            registry
                .relation("Author", "writings")
                .map(|r| r.target.name()),
            Some("Post")
        );
    }

    #[test]
    fn resolve_applies_known_targets_and_returns_the_rest() {
        let mut registry = Registry::new();
        registry
            .declare::<Post>(RelationKind::BelongsTo, "Author", "owner_id", None)
            .declare::<Author>(RelationKind::HasMany, "Post", "owner_id", None)
            .declare::<Author>(RelationKind::HasOne, "Ghost", "owner_id", None);

        assert_eq!(registry.pending().len(), 3);
        assert!(registry.relation("Post", "author").is_none());

        let unresolved = registry.resolve();

        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].target, "Ghost");
        assert!(registry.pending().is_empty());
        assert!(registry.relation("Post", "author").is_some());
        assert!(registry.relation("Author", "posts").is_some());
        assert!(registry.resolve().is_empty());
    }

    #[test]
    fn registries_do_not_share_queues() {
        let mut first = Registry::new();
        let second = Registry::new();
        first.declare::<Post>(RelationKind::BelongsTo, "Author", "owner_id", None);

        assert_eq!(first.pending().len(), 1);
        assert!(second.pending().is_empty());
    }

    #[test]
    fn computed_accessors_check_the_model() {
        let mut registry = Registry::new();
        registry.computed::<Post, _>("shout", |post| Ok(json!(post.owner_id.to_uppercase())));

        let post = Post {
            owner_id: "abc".into(),
            ..Default::default()
        };
        let author = Author::default();

        assert_eq!(
            registry
                .computed_value(&post, "shout")
                .map(|v| v.unwrap()),
            Some(json!("ABC"))
        );
        assert!(registry.computed_value(&post, "whisper").is_none());
        assert!(registry.computed_value(&author, "shout").is_none());
    }
}
