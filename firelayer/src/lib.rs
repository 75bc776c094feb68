//! Main firelayer crate: an object-document mapper for hierarchical document stores.
//!
//! This crate is the primary entry point for users of firelayer. It re-exports the core
//! types from the sub-crates, the `Model` derive and the storage backends.
//!
//! Entities live at slash-separated paths: top-level collections (`books`), documents
//! (`books/b1`) and subcollections nested under documents (`books/b1/tags`).
//!
//! # Features
//!
//! - **Typed entities** - Declare the shape with Serde, derive `Model` for the rest
//! - **Path-aware subcollections** - `SubCollection<T>` fields bind to their owner's path
//! - **Composable queries** - One filter, one ordering and a limit per query
//! - **Relationships** - belongs-to, has-one and has-many through an explicit `Registry`
//! - **Multiple backends** - In-memory and MongoDB, behind the `StoreBackend` trait
//!
//! # Quick Start
//!
//! ```ignore
//! use firelayer::{prelude::*, memory::InMemoryStore};
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
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Model)]
//! pub struct Tag {
//!     #[serde(default)]
//!     pub id: Option<String>,
//!     pub name: String,
//!     #[serde(skip)]
//!     meta: DocMeta,
//! }
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     Connection::initialize(InMemoryStore::new());
//!
//!     let book = Book { title: "Math".into(), ..Default::default() }.persist().await?;
//!     book.tags.add(&mut Tag { name: "science".into(), ..Default::default() }).await?;
//!
//!     let books = Book::filter("title", FieldOp::Eq, "Math").fetch().await?;
//!     println!("{books:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Relationships
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry
//!     .register::<Author>()
//!     .register::<Post>()
//!     .belongs_to::<Post, Author>("author_id", None)
//!     .has_many::<Author, Post>("author_id", None);
//!
//! let author = registry.related_one::<Author>(&post, "author").await?;
//! let json = post.as_json(&JsonOptions::new().include(["author"]).registry(&registry)).await?;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as firelayer;

pub mod prelude;

pub use firelayer_core::{
    backend, collection, connection, error, inflect, json, model, path, primitives, query,
    registry, relation,
};
pub use firelayer_macros::Model;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use firelayer_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use firelayer_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
