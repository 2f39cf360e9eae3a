use crawlreg_core::{
    ConfigDocument, DocumentKind, DocumentStore, JsonFileStore, OrgId, RegistryService,
    SqliteStore, StoreError, SCHEMA_VERSION,
};
use rusqlite::Connection;

#[test]
fn json_store_persists_across_service_instances() {
    let dir = tempfile::tempdir().unwrap();

    let acme_id = {
        let service = RegistryService::new(JsonFileStore::open(dir.path()).unwrap());
        let acme = service.create_organization("Acme").unwrap();
        service
            .upsert_organization_config(&acme.id, r#"{"maxPagesPerCrawl": 20}"#, None)
            .unwrap();
        acme.id
    };

    let reopened = RegistryService::new(JsonFileStore::open(dir.path()).unwrap());
    let organizations = reopened.list_organizations().unwrap();
    assert_eq!(organizations.len(), 1);
    assert_eq!(organizations[0].name, "Acme");

    let config = reopened.get_organization_config(&acme_id).unwrap();
    assert_eq!(config.max_pages_per_crawl, Some(20));
    assert!(dir.path().join("organizations.json").is_file());
    assert!(dir.path().join("configurations.json").is_file());
}

#[test]
fn json_store_reads_hand_written_documents() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("organizations.json"),
        r#"[{"ORG_ID": "1000000000003", "ORG_NAME": "Legacy"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("configurations.json"),
        r#"{"1000000000003": {"throttleRequestCount": 9, "customFlag": true}}"#,
    )
    .unwrap();

    let service = RegistryService::new(JsonFileStore::open(dir.path()).unwrap());
    let config = service
        .get_organization_config(&OrgId::Numeric(1_000_000_000_003))
        .unwrap();
    assert_eq!(config.throttle_request_count, Some(9));
    assert_eq!(config.extra["customFlag"], serde_json::json!(true));

    let next = service.create_organization("Fresh").unwrap();
    assert_eq!(next.id, OrgId::Numeric(1_000_000_000_004));
}

#[test]
fn json_store_recovers_from_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("organizations.json"), "[{\"id\": ").unwrap();

    let store = JsonFileStore::open(dir.path()).unwrap();
    assert!(store.load_organizations().unwrap().is_empty());
}

#[test]
fn json_store_surfaces_unreadable_document_as_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    std::fs::create_dir(store.document_path(DocumentKind::Organizations)).unwrap();

    let err = store.load_organizations().unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[test]
fn sqlite_store_supports_full_registry_flow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.sqlite3");

    {
        let service = RegistryService::new(SqliteStore::open(&path).unwrap());
        let acme = service.create_organization("Acme").unwrap();
        assert_eq!(
            service.get_organization_config(&acme.id).unwrap(),
            ConfigDocument::hardcoded_default()
        );
        service
            .upsert_organization_config(&acme.id, r#"{"followExternalLinks": true}"#, None)
            .unwrap();
    }

    let service = RegistryService::new(SqliteStore::open(&path).unwrap());
    let config = service
        .get_organization_config(&OrgId::Numeric(1_000_000_000_000))
        .unwrap();
    assert_eq!(config.follow_external_links, Some(true));
}

#[test]
fn sqlite_store_recovers_from_corrupt_row() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .write_raw(DocumentKind::Configurations, "{oops")
        .unwrap();
    assert!(store.load_configurations().unwrap().is_empty());
}

#[test]
fn opening_database_file_creates_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crawlreg.db");
    drop(SqliteStore::open(&path).unwrap());

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_table_exists(&conn, "documents");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crawlreg.db");

    let first = SqliteStore::open(&path).unwrap();
    first
        .write_raw(DocumentKind::Organizations, r#"[{"id": 1000000000000, "name": "Acme"}]"#)
        .unwrap();
    drop(first);

    let second = SqliteStore::open(&path).unwrap();
    assert_eq!(second.load_organizations().unwrap().len(), 1);

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match SqliteStore::open(&path) {
        Err(StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        }) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema should be refused"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_table_missing(&conn, "documents");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn assert_table_missing(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 0, "table {table_name} should not exist");
}
