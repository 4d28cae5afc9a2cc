//! These need a running postgres (see `configuration/base.yaml`), so they are
//! ignored by default:
//!
//! ```sh
//!     cargo test -- --ignored
//! ```

use chrono::Duration;
use chrono::Utc;
use claims::assert_none;
use claims::assert_some_eq;
use mangabyte::configuration::get_configuration;
use mangabyte::configuration::DatabaseSettings;
use mangabyte::configuration::StoreBackend;
use mangabyte::domain::OtpCode;
use mangabyte::domain::SubscriberEmail;
use mangabyte::store::OtpRecord;
use mangabyte::store::OtpStore;
use mangabyte::store::PgStore;
use mangabyte::store::SubscriberStore;
use serde_json::Value;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::helpers::spawn_app_with;

/// Database settings pointing at a fresh, randomly named database
fn random_database() -> DatabaseSettings {
    let mut db_cfg = get_configuration()
        .expect("failed to read configuration")
        .database;
    db_cfg.database_name = Uuid::new_v4().to_string();
    db_cfg
}

/// Create the database named in `db_cfg`; tables are created by the store's
/// migrations
async fn create_database(db_cfg: &DatabaseSettings) {
    let mut conn = PgConnection::connect_with(&db_cfg.connection_without_db())
        .await
        .expect("postgres must be running");
    conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_cfg.database_name).as_str())
        .await
        .unwrap();
}

async fn new_store() -> PgStore {
    let db_cfg = random_database();
    create_database(&db_cfg).await;
    PgStore::connect(&db_cfg).await.unwrap()
}

fn email(s: &str) -> SubscriberEmail { SubscriberEmail::parse(s.to_string()).unwrap() }

fn record(
    code: &str,
    ttl: Duration,
) -> OtpRecord {
    OtpRecord {
        code: OtpCode::parse(code.to_string()).unwrap(),
        expires_at: Utc::now() + ttl,
    }
}

#[tokio::test]
#[ignore]
async fn otp_put_replaces_pending_code() {
    let store = new_store().await;
    let who = email("sakura@konoha.jp");

    store
        .put(&who, &record("111111", Duration::minutes(10)))
        .await
        .unwrap();
    store
        .put(&who, &record("222222", Duration::minutes(10)))
        .await
        .unwrap();

    let pending = store.get(&who).await.unwrap().unwrap();
    assert_eq!(pending.code.as_ref(), "222222");
}

#[tokio::test]
#[ignore]
async fn otp_delete_compares_code() {
    let store = new_store().await;
    let who = email("sakura@konoha.jp");
    let first = record("111111", Duration::minutes(10));
    let second = record("222222", Duration::minutes(10));

    store.put(&who, &first).await.unwrap();
    store.put(&who, &second).await.unwrap();

    // a stale record does not remove the current one
    assert!(!store.delete(&who, &first).await.unwrap());
    assert!(store.get(&who).await.unwrap().is_some());

    assert!(store.delete(&who, &second).await.unwrap());
    assert_none!(store.get(&who).await.unwrap());
    assert!(!store.delete(&who, &second).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn otp_delete_expired() {
    let store = new_store().await;

    store
        .put(&email("old@konoha.jp"), &record("111111", -Duration::seconds(1)))
        .await
        .unwrap();
    store
        .put(&email("new@konoha.jp"), &record("222222", Duration::minutes(10)))
        .await
        .unwrap();

    assert_eq!(store.delete_expired(Utc::now()).await.unwrap(), 1);
    assert_none!(store.get(&email("old@konoha.jp")).await.unwrap());
    assert!(store.get(&email("new@konoha.jp")).await.unwrap().is_some());
}

#[tokio::test]
#[ignore]
async fn subscribers_add_remove_count() {
    let store = new_store().await;
    let who = email("sakura@konoha.jp");

    assert!(!store.contains(&who).await.unwrap());
    assert!(store.add(&who).await.unwrap());
    assert!(!store.add(&who).await.unwrap());
    assert!(store.add(&email("hinata@konoha.jp")).await.unwrap());
    assert!(store.contains(&who).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 2);

    assert!(store.remove(&who).await.unwrap());
    assert!(!store.remove(&who).await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
#[ignore]
async fn full_flow_with_postgres_backend() {
    let db_cfg = random_database();
    create_database(&db_cfg).await;

    let app = spawn_app_with(|cfg| {
        cfg.store.backend = StoreBackend::Postgres;
        cfg.database = db_cfg;
    })
    .await;

    let otp = app.request_otp("sakura@konoha.jp").await;
    let resp = app.post_verify_otp("sakura@konoha.jp", &otp).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = app.get_status().await.json().await.unwrap();
    assert_some_eq!(body["subscribers"].as_u64(), 1);
}
