//! MongoDB backend implementation for firelayer.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//! Each hierarchical collection path becomes one MongoDB collection, and the single
//! filter and ordering of a query are translated to MongoDB's query language.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! firelayer = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use firelayer::{connection::Connection, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     Connection::initialize_with(MongoDbStore::builder("mongodb://localhost:27017", "library"))
//!         .await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as firelayer_mongodb;

pub mod query;
pub mod sanitizer;
pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
