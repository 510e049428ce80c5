//! End-to-end behavior against a running MongoDB.
//!
//! These tests talk to a real server and are ignored by default. Start one
//! (e.g. `docker run -p 27017:27017 mongo`), then run:
//!
//! ```text
//! cargo test -p docdao-mongodb -- --ignored
//! ```
//!
//! The connection string can be overridden with `DOCDAO_TEST_DSN`. Each
//! test works in its own collection of the `docdao_tests` database.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use bson::{Uuid, doc};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use docdao_core::{
    dsl::{BsonDsl, JsonDsl, Sort, SortDirection},
    format::BsonFormat,
    index::IndexDescriptor,
    lifecycle::LifeCycle,
    model::Model,
    page::PaginationParams,
};
use docdao_mongodb::{BsonDao, Dao, FixtureSet, Fixtures, JsonDao, LazyDatabase, SwappableDatabase};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Player {
    id: Uuid,
    name: String,
    score: i64,
    joined: DateTime<Utc>,
}

impl Model for Player {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }
}

fn player(name: &str, score: i64) -> Player {
    Player {
        id: Uuid::new(),
        name: name.to_string(),
        score,
        joined: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

fn dsn() -> String {
    std::env::var("DOCDAO_TEST_DSN").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

async fn test_database() -> mongodb::Database {
    mongodb::Client::with_uri_str(dsn())
        .await
        .expect("connect to the test server")
        .database("docdao_tests")
}

async fn clean_dao(collection: &str) -> BsonDao<Player> {
    let dao: BsonDao<Player> = Dao::new(test_database().await, collection);
    dao.remove_all(None).await.expect("clear collection");
    dao
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn insert_then_find_by_id_round_trips() {
    let dao = clean_dao("live_round_trip").await;
    let model = player("ada", 10);

    let outcome = dao.insert(model.clone(), None).await.unwrap();
    assert_eq!(outcome.inserted, 1);

    assert_eq!(dao.find_by_id(model.id()).await.unwrap(), Some(model));
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn find_by_ids_omits_missing_ids() {
    let dao = clean_dao("live_find_by_ids").await;
    let models = vec![player("a", 1), player("b", 2), player("c", 3)];
    dao.bulk_insert(models.clone()).await.unwrap();

    let asked = vec![*models[0].id(), *models[2].id(), Uuid::new()];
    let found = dao.find_by_ids(&asked).await.unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|m| asked.contains(m.id())));
    assert_ne!(found[0].id(), found[1].id());
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn find_returns_the_requested_page() {
    let database = test_database().await;

    let documents = (1..=25_i64)
        .map(|score| {
            doc! {
                "id": Uuid::new(),
                "name": format!("player-{score:02}"),
                "score": score,
                "joined": "2024-05-01T12:00:00Z",
            }
        })
        .collect();
    let fixtures = Fixtures::new(database.clone());
    fixtures
        .reset(&[FixtureSet::<BsonFormat>::new("live_paging", documents)])
        .await
        .unwrap();

    let dao: BsonDao<Player> = Dao::new(database, "live_paging");
    let second = dao
        .find(
            BsonDsl::empty(),
            Some(Sort::asc("score")),
            PaginationParams::new(2, 10),
        )
        .await
        .unwrap();

    assert_eq!(
        second.iter().map(|p| p.score).collect::<Vec<_>>(),
        (11..=20).collect::<Vec<i64>>()
    );

    let page = dao
        .find_page(
            BsonDsl::empty(),
            Some(Sort::asc("score")),
            PaginationParams::new(2, 10),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.next_page(), Some(3));
    assert_eq!(page.previous_page(), Some(1));
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn find_and_remove_then_lookup_is_absent() {
    let dao = clean_dao("live_find_and_remove").await;
    let model = player("ada", 10);
    dao.insert(model.clone(), None).await.unwrap();

    let removed = dao
        .find_and_remove(BsonDsl::by_id(model.id()).unwrap(), None)
        .await
        .unwrap();
    assert_eq!(removed, Some(model.clone()));

    assert_eq!(dao.find_by_id(model.id()).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn find_and_update_returns_the_requested_image() {
    let dao = clean_dao("live_find_and_update").await;
    let model = player("ada", 10);
    dao.insert(model.clone(), None).await.unwrap();

    let before = dao
        .find_and_update(
            BsonDsl::by_id(model.id()).unwrap(),
            BsonDsl::set([BsonDsl::element("score", &11_i64).unwrap()]),
            None,
            false,
            false,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.score, 10);

    let after = dao
        .find_and_update(
            BsonDsl::by_id(model.id()).unwrap(),
            BsonDsl::set([BsonDsl::element("score", &12_i64).unwrap()]),
            None,
            true,
            false,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.score, 12);

    let missing = dao
        .find_and_update(
            BsonDsl::eq("name", "nobody").unwrap(),
            BsonDsl::set([BsonDsl::element("score", &0_i64).unwrap()]),
            None,
            false,
            false,
        )
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn save_inserts_then_replaces_the_whole_document() {
    let dao = clean_dao("live_save").await;
    let mut model = player("ada", 10);

    // save on a non-existent id inserts
    dao.save(model.clone(), None).await.unwrap();
    assert_eq!(dao.count(BsonDsl::empty()).await.unwrap(), 1);

    // graft a field the model does not know about
    dao.update_by_id(
        model.id(),
        BsonDsl::set([BsonDsl::element("bonus", &1).unwrap()]),
        None,
        false,
    )
    .await
    .unwrap();
    assert_eq!(dao.count(BsonDsl::exists("bonus").unwrap()).await.unwrap(), 1);

    // save on an existing id replaces; the grafted field does not survive
    model.score = 99;
    dao.save(model.clone(), None).await.unwrap();
    assert_eq!(dao.find_by_id(model.id()).await.unwrap(), Some(model));
    assert_eq!(dao.count(BsonDsl::exists("bonus").unwrap()).await.unwrap(), 0);
}

#[derive(Debug, Default)]
struct CountingLifeCycle {
    persisted: Arc<AtomicUsize>,
    pre_removed: Arc<AtomicUsize>,
    post_removed: Arc<AtomicUsize>,
}

impl LifeCycle<Player, Uuid> for CountingLifeCycle {
    fn post_persist(&self, _model: &Player) {
        self.persisted.fetch_add(1, Ordering::SeqCst);
    }

    fn pre_remove(&self, _id: &Uuid) {
        self.pre_removed.fetch_add(1, Ordering::SeqCst);
    }

    fn post_remove(&self, _id: &Uuid) {
        self.post_removed.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn bulk_insert_reports_count_and_fires_post_persist_per_model() {
    let persisted = Arc::new(AtomicUsize::new(0));
    let hook = CountingLifeCycle { persisted: persisted.clone(), ..Default::default() };
    let dao: BsonDao<Player> = Dao::builder(test_database().await, "live_bulk")
        .life_cycle(hook)
        .build();
    dao.remove_all(None).await.unwrap();

    let models: Vec<Player> = (0..5).map(|i| player(&format!("p{i}"), i)).collect();
    let inserted = dao.bulk_insert(models).await.unwrap();

    assert_eq!(inserted, 5);
    assert_eq!(persisted.load(Ordering::SeqCst), 5);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn remove_by_id_fires_the_remove_hooks() {
    let pre_removed = Arc::new(AtomicUsize::new(0));
    let post_removed = Arc::new(AtomicUsize::new(0));
    let hook = CountingLifeCycle {
        pre_removed: pre_removed.clone(),
        post_removed: post_removed.clone(),
        ..Default::default()
    };
    let dao: BsonDao<Player> = Dao::builder(test_database().await, "live_remove_hooks")
        .life_cycle(hook)
        .build();
    dao.remove_all(None).await.unwrap();

    let model = player("ada", 10);
    dao.insert(model.clone(), None).await.unwrap();

    let outcome = dao.remove_by_id(model.id(), None).await.unwrap();
    assert_eq!(outcome.deleted, 1);
    assert_eq!(pre_removed.load(Ordering::SeqCst), 1);
    assert_eq!(post_removed.load(Ordering::SeqCst), 1);

    assert_eq!(dao.find_by_id(model.id()).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn fold_threads_the_accumulator_in_sort_order() {
    let dao = clean_dao("live_fold").await;
    dao.bulk_insert(vec![player("c", 3), player("a", 1), player("b", 2)])
        .await
        .unwrap();

    let scores = dao
        .fold(
            BsonDsl::empty(),
            Some(Sort::asc("score")),
            Vec::new(),
            |mut acc, model: Player| {
                acc.push(model.score);
                acc
            },
        )
        .await
        .unwrap();
    assert_eq!(scores, vec![1, 2, 3]);

    // an empty matching set leaves the initial accumulator untouched
    let untouched = dao
        .fold(
            BsonDsl::eq("name", "nobody").unwrap(),
            None,
            42_i64,
            |acc, _| acc + 1,
        )
        .await
        .unwrap();
    assert_eq!(untouched, 42);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn ensure_indexes_is_idempotent() {
    let dao: BsonDao<Player> = Dao::builder(test_database().await, "live_indexes")
        .index(IndexDescriptor::on("score", SortDirection::Desc).named("by_score"))
        .index(IndexDescriptor::on("name", SortDirection::Asc))
        .build();

    let first = dao.ensure_indexes().await.unwrap();
    let second = dao.ensure_indexes().await.unwrap();
    assert_eq!(first, vec![true, true]);
    assert_eq!(second, vec![true, true]);

    let names = test_database()
        .await
        .collection::<bson::Document>("live_indexes")
        .list_index_names()
        .await
        .unwrap();
    assert_eq!(names.iter().filter(|n| n.as_str() == "by_score").count(), 1);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn find_random_picks_a_match_or_nothing() {
    let dao = clean_dao("live_random").await;
    let models: Vec<Player> = (0..8).map(|i| player(&format!("p{i}"), i)).collect();
    dao.bulk_insert(models.clone()).await.unwrap();

    let pick = dao
        .find_random(BsonDsl::empty())
        .await
        .unwrap()
        .expect("the collection is non-empty");
    assert!(models.contains(&pick));

    let none = dao
        .find_random(BsonDsl::eq("name", "nobody").unwrap())
        .await
        .unwrap();
    assert_eq!(none, None);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    id: String,
    body: String,
    score: i64,
}

impl Model for Note {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn json_flavor_round_trips_through_the_codec() {
    let provider = LazyDatabase::new(&dsn(), "docdao_tests");
    let dao: JsonDao<Note> = Dao::new(provider, "live_json");
    dao.remove_all(None).await.unwrap();

    let note = Note { id: "n-1".to_string(), body: "remember".to_string(), score: 31 };
    dao.insert(note.clone(), None).await.unwrap();
    assert_eq!(dao.find_by_id(note.id()).await.unwrap(), Some(note.clone()));

    let high = dao
        .find_all(JsonDsl::gt("score", &30).unwrap(), None)
        .await
        .unwrap();
    assert_eq!(high, vec![note]);
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn swapped_database_is_picked_up_by_later_calls() {
    let client = mongodb::Client::with_uri_str(dsn())
        .await
        .expect("connect to the test server");

    let provider = Arc::new(SwappableDatabase::new(client.database("docdao_tests")));
    let dao: BsonDao<Player> = Dao::new(provider.clone(), "live_swap");
    dao.remove_all(None).await.unwrap();
    dao.insert(player("ada", 1), None).await.unwrap();
    assert_eq!(dao.count(BsonDsl::empty()).await.unwrap(), 1);

    // the same access object now resolves a different database
    provider.swap(client.database("docdao_tests_alt")).await;
    dao.remove_all(None).await.unwrap();
    assert_eq!(dao.count(BsonDsl::empty()).await.unwrap(), 0);

    provider.swap(client.database("docdao_tests")).await;
    assert_eq!(dao.count(BsonDsl::empty()).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "requires a running MongoDB"]
async fn drop_sync_blocks_until_the_collection_is_gone() {
    let dao = clean_dao("live_drop_sync").await;
    dao.insert(player("ada", 1), None).await.unwrap();

    let blocking = dao.clone();
    tokio::task::spawn_blocking(move || blocking.drop_sync(Duration::from_secs(10)))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(dao.count(BsonDsl::empty()).await.unwrap(), 0);
}
