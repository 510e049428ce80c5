//! Convenient re-exports of commonly used types from docdao.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without importing from multiple sub-modules:
//!
//! ```ignore
//! use docdao::prelude::*;
//! ```

pub use docdao_core::{
    dsl::{BsonDsl, Comparison, Dsl, Element, JsonDsl, Sort, SortDirection},
    error::{DaoError, DaoResult},
    format::{BsonFormat, DocumentFormat, JsonFormat},
    index::IndexDescriptor,
    lifecycle::{DefaultLifeCycle, LifeCycle},
    model::Model,
    page::{Page, PaginationParams},
};

pub use docdao_mongodb::{
    WriteConcern,
    dao::{BsonDao, Dao, DaoBuilder, JsonDao, RemoveLimit},
    fixture::{FixtureSet, Fixtures},
    outcome::WriteOutcome,
    provider::{DatabaseProvider, LazyDatabase, SwappableDatabase},
};
