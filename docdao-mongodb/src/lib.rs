//! MongoDB-backed data access objects.
//!
//! This crate binds the docdao core abstractions to the MongoDB driver. It
//! provides:
//!
//! - **Access objects** ([`dao`]) - Generic CRUD, paging, streaming, and index management per collection
//! - **Handle providers** ([`provider`]) - Asynchronous sources of database handles, resolved per call
//! - **Write outcomes** ([`outcome`]) - What a write changed, as acknowledged by the server
//! - **Fixtures** ([`fixture`]) - Collection seeding for test setup
//!
//! Everything non-trivial - cursors, indexing, durability, atomicity of
//! find-and-modify - is the driver's and the server's; this layer shapes
//! requests and decodes results.
//!
//! # Example
//!
//! ```ignore
//! use docdao_mongodb::{BsonDao, Dao};
//! use docdao_core::{dsl::BsonDsl, model::Model, page::PaginationParams};
//! use bson::Uuid;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: Uuid,
//!     pub name: String,
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
//!     let users: BsonDao<User> = Dao::new(client.database("app"), "users");
//!
//!     let user = User { id: Uuid::new(), name: "Alice".to_string() };
//!     users.insert(user.clone(), None).await?;
//!
//!     let found = users.find_by_id(&user.id).await?;
//!     assert_eq!(found.as_ref().map(|u| u.name.as_str()), Some("Alice"));
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docdao_mongodb;

pub mod dao;
pub mod fixture;
pub mod outcome;
pub mod provider;

pub use dao::{BsonDao, Dao, DaoBuilder, JsonDao, RemoveLimit};
pub use fixture::{FixtureSet, Fixtures};
pub use outcome::WriteOutcome;
pub use provider::{DatabaseProvider, LazyDatabase, SwappableDatabase};

// Re-exported so callers can express durability without a direct driver
// dependency.
pub use mongodb::options::WriteConcern;
