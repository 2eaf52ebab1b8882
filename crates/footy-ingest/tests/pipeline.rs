//! End-to-end ingestion runs against mock secret store and football APIs.

use std::sync::Mutex;

use footy_collector::CollectorConfig;
use footy_core::{Record, RecordSet, Scalar, TableSchema, store::RecordStore};
use footy_ingest::{Error, Pipeline, RunOutcome, RunSummary};
use footy_store_sqlite::SqliteStore;
use footy_vault::{SecretPath, VaultClient, VaultConfig};
use serde_json::json;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{header, method, path, query_param},
};

const SECRET_PATH: &str =
  "/secrets/2023-06-13/organizations/org-1/projects/proj-1/apps/footy/open";

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn vault(server: &MockServer) -> VaultClient {
  let mut config = VaultConfig::new("test_client_id", "test_client_secret");
  config.token_url = format!("{}/oauth2/token", server.uri());
  config.api_base_url = server.uri();
  VaultClient::new(config).unwrap()
}

fn pipeline<S: RecordStore>(server: &MockServer, store: S) -> Pipeline<S> {
  Pipeline::new(
    vault(server),
    SecretPath::new("org-1", "proj-1", "footy"),
    CollectorConfig {
      base_url: format!("{}/football/", server.uri()),
      ..Default::default()
    },
    store,
    "leagues",
  )
}

async fn mount_vault(server: &MockServer, secrets: serde_json::Value) {
  Mock::given(method("POST"))
    .and(path("/oauth2/token"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T1" })))
    .expect(1)
    .mount(server)
    .await;
  Mock::given(method("GET"))
    .and(path(SECRET_PATH))
    .and(header("authorization", "Bearer T1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(secrets))
    .expect(1)
    .mount(server)
    .await;
}

fn api_key_secret() -> serde_json::Value {
  json!({ "secrets": [{ "version": { "value": "APIKEY1" } }] })
}

async fn mount_countries(server: &MockServer) {
  Mock::given(method("GET"))
    .and(path("/football/"))
    .and(query_param("action", "get_countries"))
    .and(query_param("APIkey", "APIKEY1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      { "country_id": 1, "country_name": "Brazil" },
      { "country_id": 2, "country_name": "Argentina" },
    ])))
    .mount(server)
    .await;
}

async fn mount_leagues(server: &MockServer, season: &str, expected: u64) {
  Mock::given(method("GET"))
    .and(path("/football/"))
    .and(query_param("action", "get_leagues"))
    .and(query_param("country_id", "1"))
    .and(query_param("APIkey", "APIKEY1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      { "league_id": 10, "league_name": "Serie A", "league_season": season },
    ])))
    .expect(expected)
    .mount(server)
    .await;
}

fn serie_a(season: &str) -> Record {
  Record::from([
    ("league_id".to_owned(), Scalar::Integer(10)),
    ("league_name".to_owned(), Scalar::from("Serie A")),
    ("season".to_owned(), Scalar::from(season)),
  ])
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_stores_leagues_of_country() {
  let server = MockServer::start().await;
  mount_vault(&server, api_key_secret()).await;
  mount_countries(&server).await;
  mount_leagues(&server, "2023", 1).await;

  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut ingest = pipeline(&server, store);

  let outcome = ingest.run("Brazil").await.unwrap();
  assert_eq!(
    outcome,
    RunOutcome::Completed(RunSummary { country_id: 1, leagues: 1, rows_in_table: 1 })
  );

  let row = ingest
    .store()
    .fetch_row("leagues", "league_id", &Scalar::Integer(10))
    .await
    .unwrap();
  assert_eq!(row, Some(serie_a("2023")));
}

#[tokio::test]
async fn scenario_b_rerun_updates_in_place() {
  let server = MockServer::start().await;
  mount_vault(&server, api_key_secret()).await;
  mount_countries(&server).await;
  mount_leagues(&server, "2023", 1).await;

  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut first = pipeline(&server, store);
  first.run("Brazil").await.unwrap();
  let store = first.into_store();

  server.reset().await;
  mount_vault(&server, api_key_secret()).await;
  mount_countries(&server).await;
  mount_leagues(&server, "2024", 1).await;

  let mut second = pipeline(&server, store);
  let outcome = second.run("Brazil").await.unwrap();
  assert_eq!(
    outcome,
    RunOutcome::Completed(RunSummary { country_id: 1, leagues: 1, rows_in_table: 1 })
  );

  let row = second
    .store()
    .fetch_row("leagues", "league_id", &Scalar::Integer(10))
    .await
    .unwrap();
  assert_eq!(row, Some(serie_a("2024")));
}

#[tokio::test]
async fn scenario_c_unknown_country_stops_before_leagues() {
  let server = MockServer::start().await;
  mount_vault(&server, api_key_secret()).await;
  mount_countries(&server).await;
  mount_leagues(&server, "2023", 0).await;

  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut ingest = pipeline(&server, store);

  let outcome = ingest.run("Germany").await.unwrap();
  assert_eq!(outcome, RunOutcome::CountryNotFound { country: "Germany".into() });
  assert!(!ingest.store().table_exists("leagues").await.unwrap());
}

#[tokio::test]
async fn missing_secret_stops_before_football_api() {
  let server = MockServer::start().await;
  mount_vault(&server, json!({ "secrets": [] })).await;
  Mock::given(method("GET"))
    .and(path("/football/"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .expect(0)
    .mount(&server)
    .await;

  let store = SqliteStore::open_in_memory().await.unwrap();
  let outcome = pipeline(&server, store).run("Brazil").await.unwrap();
  assert_eq!(outcome, RunOutcome::SecretNotFound);
}

#[tokio::test]
async fn rejected_credentials_abort_the_run() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/oauth2/token"))
    .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
    .mount(&server)
    .await;

  let store = SqliteStore::open_in_memory().await.unwrap();
  let err = pipeline(&server, store).run("Brazil").await.unwrap_err();
  assert!(matches!(
    err,
    Error::Vault(footy_vault::Error::Authentication { .. })
  ));
}

// ─── Store contract ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
  EnsureTable(String, TableSchema),
  UniqueIndex(String, Vec<String>),
  Upsert(String, Record, Vec<String>),
}

/// Records every call; optionally fails the upsert of one league id.
#[derive(Default)]
struct RecordingStore {
  calls:   Mutex<Vec<Call>>,
  fail_on: Option<i64>,
}

impl RecordingStore {
  fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  fn push(&self, call: Call) { self.calls.lock().unwrap().push(call); }
}

impl RecordStore for RecordingStore {
  type Error = std::io::Error;

  async fn ensure_table(&self, table: &str, schema: &TableSchema) -> std::io::Result<()> {
    self.push(Call::EnsureTable(table.to_owned(), schema.clone()));
    Ok(())
  }

  async fn ensure_unique_index(&self, table: &str, columns: &[String]) -> std::io::Result<()> {
    self.push(Call::UniqueIndex(table.to_owned(), columns.to_vec()));
    Ok(())
  }

  async fn upsert(
    &self,
    table: &str,
    record: &Record,
    unique_columns: &[String],
  ) -> std::io::Result<()> {
    let league_id = record.get("league_id").and_then(Scalar::as_integer);
    if league_id.is_some() && league_id == self.fail_on {
      return Err(std::io::Error::other("NOT NULL constraint failed"));
    }
    self.push(Call::Upsert(table.to_owned(), record.clone(), unique_columns.to_vec()));
    Ok(())
  }

  async fn table_exists(&self, _table: &str) -> std::io::Result<bool> { Ok(false) }

  async fn count_rows(&self, _table: &str) -> std::io::Result<u64> { Ok(0) }

  async fn fetch_row(
    &self,
    _table: &str,
    _key_column: &str,
    _key: &Scalar,
  ) -> std::io::Result<Option<Record>> {
    Ok(None)
  }
}

fn league(name: &str, season: &str) -> Record {
  Record::from([
    ("league_name".to_owned(), Scalar::from(name)),
    ("season".to_owned(), Scalar::from(season)),
  ])
}

fn offline_pipeline<S: RecordStore>(store: S) -> Pipeline<S> {
  Pipeline::new(
    VaultClient::new(VaultConfig::new("id", "secret")).unwrap(),
    SecretPath::new("org", "proj", "app"),
    CollectorConfig::default(),
    store,
    "leagues",
  )
}

fn two_leagues() -> RecordSet {
  [(1, league("Serie A", "2023")), (2, league("Serie B", "2023"))]
    .into_iter()
    .collect()
}

#[tokio::test]
async fn store_leagues_creates_table_then_upserts_in_order() {
  let ingest = offline_pipeline(RecordingStore::default());
  let stored = ingest.store_leagues(&two_leagues()).await.unwrap();
  assert_eq!(stored, 2);

  let key = vec!["league_id".to_owned()];
  let mut first = league("Serie A", "2023");
  first.insert("league_id".into(), Scalar::Integer(1));
  let mut second = league("Serie B", "2023");
  second.insert("league_id".into(), Scalar::Integer(2));

  let calls = ingest.store().calls();
  assert_eq!(calls.len(), 3);
  match &calls[0] {
    Call::EnsureTable(table, schema) => {
      assert_eq!(table, "leagues");
      assert_eq!(schema.column_definitions(), vec![
        ("league_id", "INTEGER PRIMARY KEY"),
        ("league_name", "TEXT"),
        ("season", "TEXT"),
      ]);
    }
    other => panic!("expected table creation first, got {other:?}"),
  }
  assert_eq!(calls[1], Call::Upsert("leagues".into(), first, key.clone()));
  assert_eq!(calls[2], Call::Upsert("leagues".into(), second, key));
}

#[tokio::test]
async fn store_leagues_with_empty_set_touches_nothing() {
  let ingest = offline_pipeline(RecordingStore::default());
  assert_eq!(ingest.store_leagues(&RecordSet::new()).await.unwrap(), 0);
  assert!(ingest.store().calls().is_empty());
}

#[tokio::test]
async fn secondary_conflict_target_gets_unique_index() {
  let ingest = offline_pipeline(RecordingStore::default())
    .with_unique_columns(vec!["league_name".to_owned()]);
  ingest.store_leagues(&two_leagues()).await.unwrap();

  let calls = ingest.store().calls();
  assert_eq!(
    calls[1],
    Call::UniqueIndex("leagues".into(), vec!["league_name".to_owned()])
  );
  assert_eq!(calls.len(), 4);
}

#[tokio::test]
async fn failed_upsert_aborts_with_earlier_rows_kept() {
  let store = RecordingStore { fail_on: Some(2), ..Default::default() };
  let ingest = offline_pipeline(store);

  let set: RecordSet = [
    (1, league("Serie A", "2023")),
    (2, league("Serie B", "2023")),
    (3, league("Serie C", "2023")),
  ]
  .into_iter()
  .collect();

  let err = ingest.store_leagues(&set).await.unwrap_err();
  assert!(matches!(err, Error::Store(_)));

  let upserted: Vec<i64> = ingest
    .store()
    .calls()
    .into_iter()
    .filter_map(|call| match call {
      Call::Upsert(_, record, _) => record.get("league_id").and_then(Scalar::as_integer),
      _ => None,
    })
    .collect();
  assert_eq!(upserted, vec![1]);
}

#[tokio::test]
async fn leagues_persist_to_a_database_file() {
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("temp").join("footy.sqlite3");

  let store = SqliteStore::open(&db).await.unwrap();
  let ingest = offline_pipeline(store);
  ingest.store_leagues(&two_leagues()).await.unwrap();
  ingest.into_store().close().await.unwrap();

  let reopened = SqliteStore::open(&db).await.unwrap();
  assert_eq!(reopened.count_rows("leagues").await.unwrap(), 2);
}

