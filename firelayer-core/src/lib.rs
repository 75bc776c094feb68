//! An object-document mapper for hierarchical document stores.
//!
//! This crate is the core of the firelayer project and provides:
//!
//! - **Entity model** ([`model`]) - Traits for typed documents, references and subcollections
//! - **Query composer** ([`collection`]) - Lazy, chainable collections of entities
//! - **Query primitives** ([`primitives`]) - The atomic reads and writes against one collection path
//! - **Query values** ([`query`]) - Filter and ordering conditions
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing different storage backends
//! - **Connection** ([`connection`]) - The process-wide store connection and its test override
//! - **Relationships** ([`registry`], [`relation`]) - Belongs-to, has-one and has-many accessors
//! - **Paths** ([`path`], [`inflect`]) - Collection and document path resolution
//! - **JSON rendering** ([`json`]) - Plain JSON output of entities
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use firelayer::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Model)]
//! pub struct User {
//!     #[serde(default)]
//!     pub id: Option<String>,
//!     pub name: String,
//!     #[serde(skip)]
//!     meta: DocMeta,
//! }
//!
//! Connection::initialize(InMemoryStore::new());
//! let user = User { name: "Alice".into(), ..Default::default() }.persist().await?;
//! assert_eq!(user.path()?, format!("users/{}", user.id().unwrap()));
//! ```

#[allow(unused_extern_crates)]
extern crate self as firelayer_core;

pub mod backend;
pub mod collection;
pub mod connection;
pub mod error;
pub mod inflect;
pub mod json;
pub mod model;
pub mod path;
pub mod primitives;
pub mod query;
pub mod registry;
pub mod relation;
