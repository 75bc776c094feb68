//! In-memory document storage backend for firelayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait,
//! keyed by hierarchical collection path. It is the test double installed through
//! `Connection::override_with`, and backs the console's `memory` mode.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Path-keyed storage** - Nested collections such as `books/b1/tags` are independent maps
//! - **Query support** - One filter, one ordering and a result cap, as the core composes them
//! - **Seeding** - Load fixtures from a BSON mapping
//!
//! # Quick Start
//!
//! ```ignore
//! use firelayer::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::test]
//! async fn saves_users() -> StoreResult<()> {
//!     let _guard = Connection::override_with(InMemoryStore::new());
//!     let user = User { name: "Alice".into(), ..Default::default() }.persist().await?;
//!     assert!(User::exists(user.id().unwrap()).await?);
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as firelayer_memory;

pub mod evaluator;
pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
