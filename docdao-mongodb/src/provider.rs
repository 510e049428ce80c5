//! Database handle providers.
//!
//! Access objects never own a connection: they hold a provider and resolve
//! a fresh database handle from it on every operation. That keeps the
//! provider free to change what stands behind a live access object - swap
//! in another database, or defer connecting until the first call - without
//! the access object being reconstructed. Providers are owned by the
//! caller; nothing here ever closes one.

use async_trait::async_trait;
use mea::rwlock::RwLock;
use mongodb::{Client, Database, options::ClientOptions};
use std::{
    fmt::{self, Debug},
    sync::Arc,
};
use tokio::sync::OnceCell;

use docdao_core::error::{DaoError, DaoResult};

/// Asynchronous source of database handles.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Debug {
    /// Resolves the database handle for the next operation.
    ///
    /// # Errors
    ///
    /// Returns a [`Connection`](DaoError::Connection) error if resolution fails.
    async fn database(&self) -> DaoResult<Database>;
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn database(&self) -> DaoResult<Database> {
        Ok(self.clone())
    }
}

#[async_trait]
impl<P> DatabaseProvider for Arc<P>
where
    P: DatabaseProvider + ?Sized,
{
    async fn database(&self) -> DaoResult<Database> {
        (**self).database().await
    }
}

/// A provider whose underlying database can be swapped while access objects
/// built on it stay live; operations issued after a swap resolve the new
/// handle.
pub struct SwappableDatabase {
    inner: RwLock<Database>,
}

impl SwappableDatabase {
    /// Wraps an initial database handle.
    pub fn new(database: Database) -> Self {
        Self { inner: RwLock::new(database) }
    }

    /// Replaces the underlying handle.
    pub async fn swap(&self, database: Database) {
        let mut guard = self.inner.write().await;
        *guard = database;
    }
}

impl Debug for SwappableDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwappableDatabase").finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseProvider for SwappableDatabase {
    async fn database(&self) -> DaoResult<Database> {
        Ok(self.inner.read().await.clone())
    }
}

/// A provider that connects on first use from a connection string and
/// database name. The connection is established once and reused.
pub struct LazyDatabase {
    dsn: String,
    database: String,
    handle: OnceCell<Database>,
}

impl LazyDatabase {
    /// Records the connection string and database name without connecting.
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            handle: OnceCell::new(),
        }
    }

    async fn connect(&self) -> DaoResult<Database> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| DaoError::Connection(e.to_string()))?;
        let client =
            Client::with_options(options).map_err(|e| DaoError::Connection(e.to_string()))?;

        Ok(client.database(&self.database))
    }
}

impl Debug for LazyDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the DSN can embed credentials; keep it out of debug output
        f.debug_struct("LazyDatabase")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DatabaseProvider for LazyDatabase {
    async fn database(&self) -> DaoResult<Database> {
        Ok(self
            .handle
            .get_or_try_init(|| self.connect())
            .await?
            .clone())
    }
}
