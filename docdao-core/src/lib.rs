//! Core building blocks for the docdao access layer.
//!
//! This crate is driver-free: everything here is pure data shaping shared by
//! the concrete access objects in `docdao-mongodb`. It provides:
//!
//! - **Document formats** ([`format`]) - The two document representations (BSON and JSON) behind one trait
//! - **Codec boundary** ([`codec`]) - Conversion between the two representations
//! - **Request builder** ([`dsl`]) - Construction of query/update documents from typed pairs
//! - **Model trait** ([`model`]) - The contract stored record types implement
//! - **Lifecycle hooks** ([`lifecycle`]) - Pre/post hooks around persist and remove
//! - **Index declarations** ([`index`]) - Per-collection index descriptors
//! - **Pagination** ([`page`]) - Page parameters and paged results
//! - **Error handling** ([`error`]) - The shared error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docdao_core::model::Model;
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
//! ```

#[allow(unused_extern_crates)]
extern crate self as docdao_core;

pub mod codec;
pub mod dsl;
pub mod error;
pub mod format;
pub mod index;
pub mod lifecycle;
pub mod model;
pub mod page;
