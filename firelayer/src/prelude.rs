//! Convenient re-exports of commonly used types from firelayer.
//!
//! ```ignore
//! use firelayer::prelude::*;
//! ```

pub use firelayer_core::{
    backend::{DynStoreBackend, StoreBackend, StoreBackendBuilder},
    collection::{AnyCollection, Collection},
    connection::Connection,
    error::{StoreError, StoreResult},
    json::JsonOptions,
    model::{AnyModel, DocMeta, DocumentRef, Model, ModelExt, SubCollection, Timestamp},
    query::{FieldOp, OrderCondition, OrderDirection, Query, WhereCondition},
    registry::Registry,
    relation::{Related, RelationKind},
};
pub use firelayer_macros::Model;
pub use firelayer_memory::InMemoryStore;
pub use serde::{Deserialize, Serialize};
