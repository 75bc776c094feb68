//! Relationship descriptors.

use futures::future::BoxFuture;
use std::{
    any::TypeId,
    fmt::{self, Debug},
    sync::Arc,
};

use crate::{
    collection::{AnyCollection, Collection},
    error::StoreResult,
    inflect::plural_accessor,
    model::{AnyModel, Field, Model, ModelExt},
};

/// The three relationship shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The declaring entity stores the target's id in a foreign-key field.
    BelongsTo,
    /// The first target whose foreign-key field equals the declaring entity's id.
    HasOne,
    /// Every target whose foreign-key field equals the declaring entity's id.
    HasMany,
}

impl RelationKind {
    /// The accessor name used when none is given.
    pub fn default_accessor(&self, target: &str) -> String {
        match self {
            RelationKind::BelongsTo | RelationKind::HasOne => target.to_lowercase(),
            RelationKind::HasMany => plural_accessor(target),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
        })
    }
}

/// Type-erased operations of one model type.
#[derive(Clone)]
pub struct ModelInfo {
    name: &'static str,
    collection: String,
    fields: Vec<Field>,
    type_id: TypeId,
    find: fn(String) -> BoxFuture<'static, StoreResult<Box<dyn AnyModel>>>,
    scope: fn() -> Box<dyn AnyCollection>,
}

impl ModelInfo {
    /// Builds the table for `M`.
    pub fn of<M: Model>() -> Self {
        Self {
            name: M::model_name(),
            collection: M::collection_name(),
            fields: M::fields(),
            type_id: TypeId::of::<M>(),
            find: find_erased::<M>,
            scope: scope_erased::<M>,
        }
    }

    /// The model name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The top-level collection name.
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// The declared fields.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns `true` if this table describes `M`.
    pub fn is<M: Model>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }

    /// Loads an entity by id or full document path.
    pub fn find(&self, path_or_id: &str) -> BoxFuture<'static, StoreResult<Box<dyn AnyModel>>> {
        (self.find)(path_or_id.to_string())
    }

    /// The unfiltered top-level collection.
    pub fn collection(&self) -> Box<dyn AnyCollection> {
        (self.scope)()
    }
}

impl Debug for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInfo")
            .field("name", &self.name)
            .field("collection", &self.collection)
            .field("fields", &self.fields)
            .finish()
    }
}

fn find_erased<M: Model>(path_or_id: String) -> BoxFuture<'static, StoreResult<Box<dyn AnyModel>>> {
    Box::pin(async move {
        let entity = M::find(&path_or_id).await?;
        Ok(Box::new(entity) as Box<dyn AnyModel>)
    })
}

fn scope_erased<M: Model>() -> Box<dyn AnyCollection> {
    Box::new(Collection::<M>::new())
}

/// A relationship declared by target name, waiting for the target to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRelation {
    /// The model declaring the relationship.
    pub declaring: &'static str,
    /// The relationship shape.
    pub kind: RelationKind,
    /// The target model name.
    pub target: String,
    /// The foreign-key field.
    pub foreign_key: String,
    /// The accessor name override.
    pub accessor: Option<String>,
}

/// A resolved relationship attached to a declaring model.
#[derive(Debug, Clone)]
pub struct Relation {
    /// The relationship shape.
    pub kind: RelationKind,
    /// The accessor name.
    pub accessor: String,
    /// The foreign-key field.
    pub foreign_key: String,
    /// The target model.
    pub target: Arc<ModelInfo>,
}

/// The value an accessor produces.
#[derive(Debug)]
pub enum Related {
    /// A single entity (belongs-to, has-one), or none.
    One(Option<Box<dyn AnyModel>>),
    /// A lazy collection (has-many).
    Many(Box<dyn AnyCollection>),
}
