//! The generic data access object.
//!
//! [`Dao`] is parametrized over a document representation and a model type
//! and forwards every operation to the driver, resolving its collection
//! handle from the supplied provider per call. It holds no mutable state:
//! concurrent operations on one instance are independent, with no ordering
//! between them beyond what the caller sequences itself.
//!
//! Use the [`BsonDao`] and [`JsonDao`] aliases for the two flavors.

use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Collection, IndexModel,
    options::{FindOptions, IndexOptions, ReturnDocument, WriteConcern},
};
use rand::Rng;
use std::{
    fmt::{self, Debug},
    marker::PhantomData,
    sync::Arc,
    time::Duration,
};
use tokio::runtime::Handle;

use docdao_core::{
    dsl::{Dsl, Sort, SortDirection},
    error::{DaoError, DaoResult},
    format::{BsonFormat, DocumentFormat, JsonFormat},
    index::IndexDescriptor,
    lifecycle::{DefaultLifeCycle, LifeCycle},
    model::Model,
    page::{Page, PaginationParams},
};

use crate::{outcome::WriteOutcome, provider::DatabaseProvider};

/// How many matches a remove may delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveLimit {
    /// At most one match.
    One,
    /// Every match.
    All,
}

/// A data access object for one model type in one collection.
///
/// Constructed once per collection per model type via [`Dao::builder`] and
/// usable for the life of the process. Cloning is cheap and clones share
/// the provider and lifecycle hook.
pub struct Dao<F: DocumentFormat, M: Model> {
    db: Arc<dyn DatabaseProvider>,
    collection_name: String,
    life_cycle: Arc<dyn LifeCycle<M, M::Id>>,
    auto_indexes: Arc<[IndexDescriptor]>,
    _marker: PhantomData<fn() -> (F, M)>,
}

/// Access object over the BSON representation.
pub type BsonDao<M> = Dao<BsonFormat, M>;
/// Access object over the JSON representation.
pub type JsonDao<M> = Dao<JsonFormat, M>;

impl<F: DocumentFormat, M: Model> Clone for Dao<F, M> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            collection_name: self.collection_name.clone(),
            life_cycle: self.life_cycle.clone(),
            auto_indexes: self.auto_indexes.clone(),
            _marker: PhantomData,
        }
    }
}

impl<F: DocumentFormat, M: Model> Debug for Dao<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dao")
            .field("collection", &self.collection_name)
            .field("auto_indexes", &self.auto_indexes.len())
            .finish_non_exhaustive()
    }
}

impl<F: DocumentFormat, M: Model> Dao<F, M> {
    /// Starts building an access object over the named collection.
    pub fn builder(
        db: impl DatabaseProvider + 'static,
        collection_name: impl Into<String>,
    ) -> DaoBuilder<F, M> {
        DaoBuilder {
            db: Arc::new(db),
            collection_name: collection_name.into(),
            life_cycle: Arc::new(DefaultLifeCycle),
            auto_indexes: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Constructs an access object with the default lifecycle hook and no
    /// declared indexes.
    pub fn new(db: impl DatabaseProvider + 'static, collection_name: impl Into<String>) -> Self {
        Self::builder(db, collection_name).build()
    }

    /// The name of the collection this access object operates on.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Looks up one model by id; absent if nothing matches.
    pub async fn find_by_id(&self, id: &M::Id) -> DaoResult<Option<M>> {
        self.collection()
            .await?
            .find_one(Self::id_selector(id)?)
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?
            .map(Self::from_storage)
            .transpose()
    }

    /// Looks up many ids at once.
    ///
    /// Missing ids are silently omitted, so the result holds at most as
    /// many models as ids were given.
    pub async fn find_by_ids(&self, ids: &[M::Id]) -> DaoResult<Vec<M>> {
        let ids = ids
            .iter()
            .map(Self::wire_id)
            .collect::<DaoResult<Vec<_>>>()?;

        self.collect(doc! { "_id": { "$in": ids } }, None, None, None)
            .await
    }

    /// First match under no particular order; absent if none.
    pub async fn find_one(&self, selector: F::Doc) -> DaoResult<Option<M>> {
        self.collection()
            .await?
            .find_one(F::into_wire(selector)?)
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?
            .map(Self::from_storage)
            .transpose()
    }

    /// One page of matches. Pages are 1-based; the page before this one is
    /// skipped on the server.
    pub async fn find(
        &self,
        selector: F::Doc,
        sort: Option<Sort>,
        pages: PaginationParams,
    ) -> DaoResult<Vec<M>> {
        self.collect(
            F::into_wire(selector)?,
            sort.as_ref(),
            Some(pages.offset() as u64),
            Some(pages.per_page as i64),
        )
        .await
    }

    /// Every match at once.
    ///
    /// The result set is unbounded; callers accept the memory cost. Prefer
    /// [`find`](Dao::find) or [`fold`](Dao::fold) over large collections.
    pub async fn find_all(&self, selector: F::Doc, sort: Option<Sort>) -> DaoResult<Vec<M>> {
        self.collect(F::into_wire(selector)?, sort.as_ref(), None, None)
            .await
    }

    /// One page of matches together with the total match count.
    pub async fn find_page(
        &self,
        selector: F::Doc,
        sort: Option<Sort>,
        pages: PaginationParams,
    ) -> DaoResult<Page<M>> {
        let total = self.count(selector.clone()).await?;
        let items = self.find(selector, sort, pages).await?;

        Ok(Page::new(items, total, pages))
    }

    /// Atomic find-and-modify.
    ///
    /// Returns the pre-image unless `fetch_new` asks for the updated
    /// document; absent when nothing matched and `upsert` is off. The sort
    /// picks which of several matches is modified.
    pub async fn find_and_update(
        &self,
        selector: F::Doc,
        update: F::Doc,
        sort: Option<Sort>,
        fetch_new: bool,
        upsert: bool,
    ) -> DaoResult<Option<M>> {
        let collection = self.collection().await?;
        let mut action = collection
            .find_one_and_update(F::into_wire(selector)?, F::into_wire(update)?)
            .upsert(upsert)
            .return_document(if fetch_new {
                ReturnDocument::After
            } else {
                ReturnDocument::Before
            });
        if let Some(sort) = &sort {
            action = action.sort(Self::sort_document(sort));
        }

        action
            .await
            .map_err(|e| DaoError::Write(e.to_string()))?
            .map(Self::from_storage)
            .transpose()
    }

    /// Atomic find-and-delete; the sort picks which of several matches is
    /// removed. Returns the removed model, absent if nothing matched.
    pub async fn find_and_remove(
        &self,
        selector: F::Doc,
        sort: Option<Sort>,
    ) -> DaoResult<Option<M>> {
        let collection = self.collection().await?;
        let mut action = collection.find_one_and_delete(F::into_wire(selector)?);
        if let Some(sort) = &sort {
            action = action.sort(Self::sort_document(sort));
        }

        action
            .await
            .map_err(|e| DaoError::Write(e.to_string()))?
            .map(Self::from_storage)
            .transpose()
    }

    /// Counts the matches, draws a uniform offset, and fetches the document
    /// sitting there; absent when nothing matches.
    ///
    /// The count and the fetch are separate server calls: a concurrent
    /// write between them can change which document (or none) comes back.
    pub async fn find_random(&self, selector: F::Doc) -> DaoResult<Option<M>> {
        let selector = F::into_wire(selector)?;
        let count = self
            .collection()
            .await?
            .count_documents(selector.clone())
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?;
        if count == 0 {
            return Ok(None);
        }

        let offset = rand::thread_rng().gen_range(0..count);

        self.collection()
            .await?
            .find_one(selector)
            .skip(offset)
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?
            .map(Self::from_storage)
            .transpose()
    }

    /// Counts the documents matching a selector.
    pub async fn count(&self, selector: F::Doc) -> DaoResult<u64> {
        self.collection()
            .await?
            .count_documents(F::into_wire(selector)?)
            .await
            .map_err(|e| DaoError::Query(e.to_string()))
    }

    /// Persists one model inside the pre/post persist hook envelope.
    pub async fn insert(
        &self,
        model: M,
        write_concern: Option<WriteConcern>,
    ) -> DaoResult<WriteOutcome> {
        let model = self.life_cycle.pre_persist(model);
        let document = Self::to_storage(&model)?;

        let collection = self.collection().await?;
        let mut action = collection.insert_one(document);
        if let Some(wc) = write_concern {
            action = action.write_concern(wc);
        }
        let result = action
            .await
            .map_err(|e| DaoError::Write(e.to_string()))?;

        self.life_cycle.post_persist(&model);

        Ok(result.into())
    }

    /// Persists a batch in one unordered write, returning the inserted
    /// count.
    ///
    /// Pre-persist maps every model before the write; post-persist observes
    /// every model once the batch call returns, even when some documents
    /// inside the batch were rejected. Partial-failure semantics belong to
    /// the driver.
    pub async fn bulk_insert(&self, models: Vec<M>) -> DaoResult<u64> {
        let models: Vec<M> = models
            .into_iter()
            .map(|model| self.life_cycle.pre_persist(model))
            .collect();
        let documents = models
            .iter()
            .map(Self::to_storage)
            .collect::<DaoResult<Vec<_>>>()?;

        let result = self
            .collection()
            .await?
            .insert_many(documents)
            .ordered(false)
            .await;

        for model in &models {
            self.life_cycle.post_persist(model);
        }

        let reply = result.map_err(|e| DaoError::Write(e.to_string()))?;

        Ok(reply.inserted_ids.len() as u64)
    }

    /// Forwards an update; no lifecycle hooks fire.
    pub async fn update(
        &self,
        selector: F::Doc,
        update: F::Doc,
        write_concern: Option<WriteConcern>,
        upsert: bool,
        multi: bool,
    ) -> DaoResult<WriteOutcome> {
        let selector = F::into_wire(selector)?;
        let update = F::into_wire(update)?;
        let collection = self.collection().await?;

        let result = if multi {
            let mut action = collection.update_many(selector, update).upsert(upsert);
            if let Some(wc) = write_concern {
                action = action.write_concern(wc);
            }
            action.await
        } else {
            let mut action = collection.update_one(selector, update).upsert(upsert);
            if let Some(wc) = write_concern {
                action = action.write_concern(wc);
            }
            action.await
        };

        Ok(result
            .map_err(|e| DaoError::Write(e.to_string()))?
            .into())
    }

    /// Forwards an update addressed by id; no lifecycle hooks fire.
    pub async fn update_by_id(
        &self,
        id: &M::Id,
        update: F::Doc,
        write_concern: Option<WriteConcern>,
        upsert: bool,
    ) -> DaoResult<WriteOutcome> {
        let collection = self.collection().await?;
        let mut action = collection
            .update_one(Self::id_selector(id)?, F::into_wire(update)?)
            .upsert(upsert);
        if let Some(wc) = write_concern {
            action = action.write_concern(wc);
        }

        Ok(action
            .await
            .map_err(|e| DaoError::Write(e.to_string()))?
            .into())
    }

    /// Upserts by the model's id, replacing the stored document entirely;
    /// fields absent from this model are gone afterwards. The hook envelope
    /// matches [`insert`](Dao::insert).
    pub async fn save(
        &self,
        model: M,
        write_concern: Option<WriteConcern>,
    ) -> DaoResult<WriteOutcome> {
        let model = self.life_cycle.pre_persist(model);
        let selector = Self::id_selector(model.id())?;
        let document = Self::to_storage(&model)?;

        let collection = self.collection().await?;
        let mut action = collection
            .replace_one(selector, document)
            .upsert(true);
        if let Some(wc) = write_concern {
            action = action.write_concern(wc);
        }
        let result = action
            .await
            .map_err(|e| DaoError::Write(e.to_string()))?;

        self.life_cycle.post_persist(&model);

        Ok(result.into())
    }

    /// Removes one model by id; pre-remove fires before the call is
    /// issued, post-remove after it returns.
    pub async fn remove_by_id(
        &self,
        id: &M::Id,
        write_concern: Option<WriteConcern>,
    ) -> DaoResult<WriteOutcome> {
        self.life_cycle.pre_remove(id);

        let collection = self.collection().await?;
        let mut action = collection.delete_one(Self::id_selector(id)?);
        if let Some(wc) = write_concern {
            action = action.write_concern(wc);
        }
        let result = action
            .await
            .map_err(|e| DaoError::Write(e.to_string()))?;

        self.life_cycle.post_remove(id);

        Ok(result.into())
    }

    /// Removes matches; no lifecycle hooks fire.
    pub async fn remove(
        &self,
        selector: F::Doc,
        limit: RemoveLimit,
        write_concern: Option<WriteConcern>,
    ) -> DaoResult<WriteOutcome> {
        let selector = F::into_wire(selector)?;
        let collection = self.collection().await?;

        let result = match limit {
            RemoveLimit::One => {
                let mut action = collection.delete_one(selector);
                if let Some(wc) = write_concern {
                    action = action.write_concern(wc);
                }
                action.await
            }
            RemoveLimit::All => {
                let mut action = collection.delete_many(selector);
                if let Some(wc) = write_concern {
                    action = action.write_concern(wc);
                }
                action.await
            }
        };

        Ok(result
            .map_err(|e| DaoError::Write(e.to_string()))?
            .into())
    }

    /// Removes every document in the collection.
    pub async fn remove_all(&self, write_concern: Option<WriteConcern>) -> DaoResult<WriteOutcome> {
        self.remove(Dsl::<F>::empty(), RemoveLimit::All, write_concern)
            .await
    }

    /// Drops the whole collection.
    pub async fn drop(&self) -> DaoResult<()> {
        self.collection()
            .await?
            .drop()
            .await
            .map_err(|e| DaoError::Write(e.to_string()))
    }

    /// Drops the collection from synchronous code, blocking the calling
    /// thread until the drop completes or `timeout` elapses.
    ///
    /// The drop runs on the ambient async runtime; calling this from a
    /// thread that is single-handedly driving that runtime will deadlock.
    pub fn drop_sync(&self, timeout: Duration) -> DaoResult<()> {
        let handle = Handle::try_current()
            .map_err(|_| DaoError::Connection("no async runtime to run the drop on".to_string()))?;

        let (tx, rx) = std::sync::mpsc::channel();
        let dao = self.clone();
        handle.spawn(async move {
            let _ = tx.send(dao.drop().await);
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(_) => Err(DaoError::Timeout(timeout)),
        }
    }

    /// Applies every declared index, returning one success flag per
    /// descriptor.
    ///
    /// Individual failures are logged and reported in the flags, never as
    /// an `Err` - one bad index definition must not block the rest. Runs
    /// once automatically at construction and may be invoked again at any
    /// time; re-applying an unchanged list creates nothing new.
    pub async fn ensure_indexes(&self) -> DaoResult<Vec<bool>> {
        let collection = self.collection().await?;

        let mut applied = Vec::with_capacity(self.auto_indexes.len());
        for descriptor in self.auto_indexes.iter() {
            match collection.create_index(Self::index_model(descriptor)).await {
                Ok(_) => applied.push(true),
                Err(e) => {
                    tracing::warn!(
                        collection = %self.collection_name,
                        index = descriptor.name().unwrap_or("<unnamed>"),
                        error = %e,
                        "failed to apply declared index",
                    );
                    applied.push(false);
                }
            }
        }

        self.life_cycle.ensured_indexes();

        Ok(applied)
    }

    /// Streams matches through `combine`, threading the accumulator
    /// strictly left to right in server-return order without materializing
    /// the result set.
    ///
    /// One cursor stays open for the duration; once started the stream runs
    /// to completion or failure.
    pub async fn fold<A, Fun>(
        &self,
        selector: F::Doc,
        sort: Option<Sort>,
        initial: A,
        mut combine: Fun,
    ) -> DaoResult<A>
    where
        A: Send,
        Fun: FnMut(A, M) -> A + Send,
    {
        let mut options = FindOptions::default();
        if let Some(sort) = &sort {
            options.sort = Some(Self::sort_document(sort));
        }

        let mut cursor = self
            .collection()
            .await?
            .find(F::into_wire(selector)?)
            .with_options(options)
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?;

        let mut accumulator = initial;
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?
        {
            accumulator = combine(accumulator, Self::from_storage(document)?);
        }

        Ok(accumulator)
    }

    /// Visits every match in server-return order without materializing the
    /// result set.
    pub async fn for_each<V>(
        &self,
        selector: F::Doc,
        sort: Option<Sort>,
        mut visit: V,
    ) -> DaoResult<()>
    where
        V: FnMut(M) + Send,
    {
        self.fold(selector, sort, (), |(), model| visit(model))
            .await
    }

    // resolved fresh on every operation so the provider can change the
    // underlying database between calls
    async fn collection(&self) -> DaoResult<Collection<Document>> {
        Ok(self
            .db
            .database()
            .await?
            .collection(&self.collection_name))
    }

    async fn collect(
        &self,
        selector: Document,
        sort: Option<&Sort>,
        skip: Option<u64>,
        limit: Option<i64>,
    ) -> DaoResult<Vec<M>> {
        let mut options = FindOptions::default();
        options.skip = skip;
        options.limit = limit;
        if let Some(sort) = sort {
            options.sort = Some(Self::sort_document(sort));
        }

        self.collection()
            .await?
            .find(selector)
            .with_options(options)
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| DaoError::Query(e.to_string()))?
            .into_iter()
            .map(Self::from_storage)
            .collect()
    }

    fn wire_id(id: &M::Id) -> DaoResult<Bson> {
        F::value_into_wire(F::encode_value(id)?)
    }

    fn id_selector(id: &M::Id) -> DaoResult<Document> {
        Ok(doc! { "_id": Self::wire_id(id)? })
    }

    fn to_storage(model: &M) -> DaoResult<Document> {
        let mut document = F::into_wire(F::encode_model(model)?)?;
        document.insert("_id", Self::wire_id(model.id())?);

        Ok(document)
    }

    fn from_storage(mut document: Document) -> DaoResult<M> {
        document.remove("_id");

        F::decode_model(F::from_wire(document)?)
    }

    fn sort_document(sort: &Sort) -> Document {
        doc! {
            sort.field.clone(): match sort.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            }
        }
    }

    fn index_model(descriptor: &IndexDescriptor) -> IndexModel {
        let keys = Document::from_iter(descriptor.keys().iter().map(|(field, direction)| {
            (
                field.clone(),
                Bson::Int32(match direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }),
            )
        }));

        IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .unique(descriptor.is_unique())
                    .sparse(descriptor.is_sparse())
                    .background(descriptor.is_background())
                    .name(descriptor.name().map(str::to_string))
                    .build(),
            )
            .build()
    }

    fn spawn_auto_indexes(&self) {
        if self.auto_indexes.is_empty() {
            return;
        }

        match Handle::try_current() {
            Ok(handle) => {
                let dao = self.clone();
                handle.spawn(async move {
                    if let Err(e) = dao.ensure_indexes().await {
                        tracing::warn!(
                            collection = %dao.collection_name,
                            error = %e,
                            "auto index application failed",
                        );
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    collection = %self.collection_name,
                    "no async runtime at construction; declared indexes were not applied",
                );
            }
        }
    }
}

/// Builder assembling a [`Dao`] from its provider, collection name, and
/// optional lifecycle hook and index list.
pub struct DaoBuilder<F: DocumentFormat, M: Model> {
    db: Arc<dyn DatabaseProvider>,
    collection_name: String,
    life_cycle: Arc<dyn LifeCycle<M, M::Id>>,
    auto_indexes: Vec<IndexDescriptor>,
    _marker: PhantomData<fn() -> (F, M)>,
}

impl<F: DocumentFormat, M: Model> DaoBuilder<F, M> {
    /// Supplies the lifecycle hook fired around persist/remove operations.
    pub fn life_cycle(mut self, hook: impl LifeCycle<M, M::Id> + 'static) -> Self {
        self.life_cycle = Arc::new(hook);
        self
    }

    /// Declares one index to maintain on the collection.
    pub fn index(mut self, descriptor: IndexDescriptor) -> Self {
        self.auto_indexes.push(descriptor);
        self
    }

    /// Declares several indexes at once.
    pub fn indexes(mut self, descriptors: impl IntoIterator<Item = IndexDescriptor>) -> Self {
        self.auto_indexes.extend(descriptors);
        self
    }

    /// Builds the access object and kicks off the one-time application of
    /// its declared indexes. Index failures never surface here.
    pub fn build(self) -> Dao<F, M> {
        let dao = Dao {
            db: self.db,
            collection_name: self.collection_name,
            life_cycle: self.life_cycle,
            auto_indexes: self.auto_indexes.into(),
            _marker: PhantomData,
        };
        dao.spawn_auto_indexes();

        dao
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Gadget {
        id: i64,
        label: String,
    }

    impl Model for Gadget {
        type Id = i64;

        fn id(&self) -> &i64 {
            &self.id
        }
    }

    #[test]
    fn storage_documents_carry_the_id_field() {
        let gadget = Gadget { id: 9, label: "widget".to_string() };

        let stored = BsonDao::<Gadget>::to_storage(&gadget).unwrap();
        assert_eq!(stored, doc! { "id": 9_i64, "label": "widget", "_id": 9_i64 });

        let restored = BsonDao::<Gadget>::from_storage(stored).unwrap();
        assert_eq!(restored, gadget);
    }

    #[test]
    fn json_flavor_storage_round_trips() {
        let gadget = Gadget { id: 3, label: "sprocket".to_string() };

        let stored = JsonDao::<Gadget>::to_storage(&gadget).unwrap();
        assert_eq!(stored, doc! { "id": 3_i64, "label": "sprocket", "_id": 3_i64 });

        let restored = JsonDao::<Gadget>::from_storage(stored).unwrap();
        assert_eq!(restored, gadget);
    }

    #[test]
    fn id_selector_addresses_the_underscore_field() {
        assert_eq!(
            BsonDao::<Gadget>::id_selector(&9).unwrap(),
            doc! { "_id": 9_i64 }
        );
    }

    #[test]
    fn sort_documents_use_signed_directions() {
        assert_eq!(
            BsonDao::<Gadget>::sort_document(&Sort::asc("label")),
            doc! { "label": 1 }
        );
        assert_eq!(
            BsonDao::<Gadget>::sort_document(&Sort::desc("label")),
            doc! { "label": -1 }
        );
    }

    #[test]
    fn index_models_mirror_the_descriptor() {
        let descriptor = IndexDescriptor::on("label", SortDirection::Asc)
            .and("id", SortDirection::Desc)
            .unique()
            .named("gadgets_by_label");

        let model = BsonDao::<Gadget>::index_model(&descriptor);
        assert_eq!(model.keys, doc! { "label": 1, "id": -1 });

        let options = model.options.expect("options are always set");
        assert_eq!(options.unique, Some(true));
        assert_eq!(options.sparse, Some(false));
        assert_eq!(options.name.as_deref(), Some("gadgets_by_label"));
    }
}
