//! Collection seeding for test setup.
//!
//! Fixtures put named collections into a known state from in-memory
//! document sequences and tear them down again. This is tooling for test
//! suites, not an operational path.

use bson::doc;
use std::sync::Arc;

use docdao_core::{
    error::{DaoError, DaoResult},
    format::DocumentFormat,
};

use crate::provider::DatabaseProvider;

/// A named collection plus the documents that seed it.
#[derive(Debug, Clone)]
pub struct FixtureSet<F: DocumentFormat> {
    collection: String,
    documents: Vec<F::Doc>,
}

impl<F: DocumentFormat> FixtureSet<F> {
    /// Bundles documents under the collection they seed.
    pub fn new(collection: impl Into<String>, documents: Vec<F::Doc>) -> Self {
        Self { collection: collection.into(), documents }
    }

    /// The collection this set seeds.
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// Seeds and clears collections through a database-handle provider.
#[derive(Debug)]
pub struct Fixtures {
    db: Arc<dyn DatabaseProvider>,
}

impl Fixtures {
    /// Creates a loader over the given provider.
    pub fn new(db: impl DatabaseProvider + 'static) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Inserts a set's documents into its collection.
    pub async fn load<F: DocumentFormat>(&self, set: &FixtureSet<F>) -> DaoResult<()> {
        let documents = set
            .documents
            .iter()
            .cloned()
            .map(F::into_wire)
            .collect::<DaoResult<Vec<_>>>()?;
        if documents.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            collection = %set.collection,
            count = documents.len(),
            "loading fixture documents",
        );

        self.db
            .database()
            .await?
            .collection::<bson::Document>(&set.collection)
            .insert_many(documents)
            .await
            .map_err(|e| DaoError::Write(e.to_string()))?;

        Ok(())
    }

    /// Empties the named collections.
    pub async fn clear(&self, collections: &[&str]) -> DaoResult<()> {
        let database = self.db.database().await?;

        for name in collections {
            tracing::debug!(collection = %name, "clearing fixture collection");

            database
                .collection::<bson::Document>(name)
                .delete_many(doc! {})
                .await
                .map_err(|e| DaoError::Write(e.to_string()))?;
        }

        Ok(())
    }

    /// Clears every set's collection, then loads all sets in order.
    pub async fn reset<F: DocumentFormat>(&self, sets: &[FixtureSet<F>]) -> DaoResult<()> {
        let collections: Vec<&str> = sets.iter().map(FixtureSet::collection).collect();
        self.clear(&collections).await?;

        for set in sets {
            self.load(set).await?;
        }

        Ok(())
    }
}
