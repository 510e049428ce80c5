//! A thin typed DAO convenience layer over the MongoDB driver.
//!
//! This crate is the primary entry point for users of the docdao workspace.
//! It re-exports the core abstractions and the MongoDB-backed access
//! objects from the sub-crates.
//!
//! # Features
//!
//! - **Typed access objects** - One [`dao::Dao`] per collection per model type, generic CRUD and paging
//! - **Two document flavors** - The same access layer over BSON ([`dao::BsonDao`]) or JSON ([`dao::JsonDao`]) documents
//! - **Request builder** - Composable construction of selector and update documents ([`dsl`])
//! - **Lifecycle hooks** - Pluggable pre/post hooks around persist and remove ([`lifecycle`])
//! - **Declared indexes** - Per-collection index descriptors applied idempotently at construction ([`index`])
//!
//! Everything non-trivial - cursors, indexing, durability, atomicity - is
//! delegated to the MongoDB driver and server; this layer shapes requests
//! and decodes results.
//!
//! # Quick Start
//!
//! ```ignore
//! use docdao::prelude::*;
//! use bson::Uuid;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: Uuid,
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! impl Model for User {
//!     type Id = Uuid;
//!
//!     fn id(&self) -> &Uuid {
//!         &self.id
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
//!     let users: BsonDao<User> = Dao::builder(client.database("app"), "users")
//!         .index(IndexDescriptor::on("name", SortDirection::Asc).unique())
//!         .build();
//!
//!     let user = User { id: Uuid::new(), name: "Alice".to_string(), age: 34 };
//!     users.insert(user.clone(), None).await?;
//!
//!     let adults = users
//!         .find(BsonDsl::gte("age", &18)?, Some(Sort::asc("name")), PaginationParams::new(1, 20))
//!         .await?;
//!     println!("found {} adults", adults.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Flavors
//!
//! The access layer is generic over its document representation. The BSON
//! flavor hands the driver's native documents straight through; the JSON
//! flavor works in `serde_json` values and crosses the [`codec`] boundary
//! at the wire. Pick per collection with the [`dao::BsonDao`] and
//! [`dao::JsonDao`] aliases - the operation surface is identical.

pub mod prelude;

pub use docdao_core::{codec, dsl, error, format, index, lifecycle, model, page};
pub use docdao_mongodb::{dao, fixture, outcome, provider};

// Re-export BSON types for convenience
pub use bson;
