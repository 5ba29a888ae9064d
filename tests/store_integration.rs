//! Store tests against a live PostgreSQL.
//!
//! Set `TEST_DATABASE_URL` to run them; without it every test returns early.
//! Tables are deployed once per run with the default (per-table unique
//! username) layout and every test works on its own usernames.

use chrono::{Duration as ChronoDuration, Utc};
use gridlab_store::config::Config;
use gridlab_store::models::{
    NewReportLabel, NewReportMetadata, NewScenarioLabel, NewScenarioMetadata, NewTimeseriesData,
    ReportLabel, ReportMetadata, ScenarioLabel, ScenarioMetadata, TimeseriesData, User, UserIn,
};
use gridlab_store::password::MIN_COST;
use gridlab_store::pool::create_pool;
use gridlab_store::schema::{SchemaRegistry, SchemaVerifier, TableDeployer};
use gridlab_store::{Store, StoreError};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

static DEPLOYED: OnceCell<()> = OnceCell::const_new();
static COUNTER: AtomicUsize = AtomicUsize::new(0);

async fn store() -> Option<Store> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return None;
    };

    let config = Config {
        database_url: url,
        max_connections: 4,
        pool_timeout: Duration::from_secs(5),
        bcrypt_cost: MIN_COST,
        unique_username_per_table: true,
        log_dir: None,
    };

    let pool = create_pool(&config).unwrap();
    let registry = SchemaRegistry::new(config.schema_options());

    DEPLOYED
        .get_or_init(|| async {
            TableDeployer::new().deploy(&pool, &registry).await.unwrap();
        })
        .await;

    Some(Store::new(pool, registry, config.bcrypt_cost))
}

fn unique_name(prefix: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        prefix,
        std::process::id(),
        Utc::now().timestamp_micros(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

fn new_scenario(username: &str) -> NewScenarioMetadata {
    NewScenarioMetadata {
        username: username.to_string(),
        name: "Feeder 12 summer peak".to_string(),
        description: "Rooftop solar with managed EV charging".to_string(),
        solar: true,
        ev: true,
        storage: false,
        filename: "feeder12_summer.json".to_string(),
    }
}

#[tokio::test]
async fn duplicate_username_is_a_unique_violation() {
    let Some(store) = store().await else { return };
    let username = unique_name("dup");

    store
        .create_user(&username, "pw", &format!("{}@a.example", username))
        .await
        .unwrap();

    let err = store
        .create_user(&username, "pw", &format!("{}@b.example", username))
        .await
        .unwrap_err();

    match err {
        StoreError::UniqueViolation { table, constraint } => {
            assert_eq!(table, "users");
            assert!(constraint.contains("username"), "{}", constraint);
        }
        other => panic!("expected unique violation, got {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_email_is_a_unique_violation() {
    let Some(store) = store().await else { return };
    let email = format!("{}@example.com", unique_name("mail"));

    store.create_user(&unique_name("u"), "pw", &email).await.unwrap();
    let err = store.create_user(&unique_name("u"), "pw", &email).await.unwrap_err();

    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn stored_user_verifies_its_password() {
    let Some(store) = store().await else { return };
    let username = unique_name("verify");

    store
        .create_user(&username, "correct horse", &format!("{}@example.com", username))
        .await
        .unwrap();

    let user = store.user_by_username(&username).await.unwrap().unwrap();
    assert_ne!(user.hashed_password, "correct horse");
    assert!(user.verify_password("correct horse").unwrap());
    assert!(!user.verify_password("battery staple").unwrap());
    assert!(!user.is_logged_in);

    let by_email = store
        .user_by_email(&user.email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(user.token().id, user.id);
}

#[tokio::test]
async fn save_refreshes_last_logged_date_but_not_created_at() {
    let Some(store) = store().await else { return };
    let username = unique_name("save");

    let input = UserIn::with_password(&username, "pw", &format!("{}@example.com", username), MIN_COST)
        .await
        .unwrap();
    let mut user = store.insert(&input).await.unwrap();
    let created_at = user.created_at;
    let first_login = user.last_logged_date;

    tokio::time::sleep(Duration::from_millis(5)).await;
    store.set_logged_in(&mut user, true).await.unwrap();

    assert!(user.is_logged_in);
    assert_eq!(user.created_at, created_at);
    assert!(user.last_logged_date > first_login);

    let second_login = user.last_logged_date;
    tokio::time::sleep(Duration::from_millis(5)).await;
    store.save(&mut user).await.unwrap();
    assert!(user.last_logged_date > second_login);

    let reloaded: User = store.get(user.id).await.unwrap();
    assert_eq!(reloaded, user);
}

#[tokio::test]
async fn timeseries_round_trip() {
    let Some(store) = store().await else { return };
    let username = unique_name("ts");
    let start = Utc::now() - ChronoDuration::days(7);

    let new = NewTimeseriesData {
        username: username.clone(),
        start_date: start,
        end_date: start + ChronoDuration::days(7),
        resolution_min: Decimal::from_str("15.5").unwrap(),
        name: "Substation load".to_string(),
        description: "Hourly feeder load".to_string(),
        image: "load.png".to_string(),
        filename: "load.csv".to_string(),
        category: "load".to_string(),
    };
    let inserted = store.insert(&new).await.unwrap();
    assert_eq!(inserted.resolution_min, Decimal::from_str("15.500").unwrap());

    let found = store.filter_by_username::<TimeseriesData>(&username).await.unwrap();
    assert_eq!(found, vec![inserted]);

    // One dataset per username under the default layout
    let err = store.insert(&new).await.unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn invalid_values_never_reach_the_database() {
    let Some(store) = store().await else { return };
    let before = store.count::<TimeseriesData>().await.unwrap();

    let start = Utc::now();
    let new = NewTimeseriesData {
        username: unique_name("bad"),
        start_date: start,
        end_date: start,
        resolution_min: Decimal::from_str("0.0001").unwrap(),
        name: "n".to_string(),
        description: "d".to_string(),
        image: "i".to_string(),
        filename: "f".to_string(),
        category: "c".to_string(),
    };

    let err = store.insert(&new).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidField { ref field, .. } if field == "resolution_min"));
    assert_eq!(store.count::<TimeseriesData>().await.unwrap(), before);
}

#[tokio::test]
async fn scenario_and_report_labels() {
    let Some(store) = store().await else { return };
    let username = unique_name("labels");

    let scenario = store.insert(&new_scenario(&username)).await.unwrap();
    let report = store
        .insert(&NewReportMetadata {
            username: username.clone(),
            name: "Hosting capacity".to_string(),
            description: "Summer peak hosting capacity".to_string(),
            status: "completed".to_string(),
            scenario_name: scenario.name.clone(),
            report_file: "report.html".to_string(),
            report_data_file: "report.json".to_string(),
        })
        .await
        .unwrap();

    let scenario_label = store
        .insert(&NewScenarioLabel {
            scenario_id: scenario.id,
            username: username.clone(),
            labelname: "baseline".to_string(),
        })
        .await
        .unwrap();
    let report_label = store
        .insert(&NewReportLabel {
            report_id: report.id,
            username: username.clone(),
            labelname: "published".to_string(),
        })
        .await
        .unwrap();

    let labels: Vec<ScenarioLabel> = store.labels_for_scenario(scenario.id).await.unwrap();
    assert_eq!(labels, vec![scenario_label]);

    let labels: Vec<ReportLabel> = store.labels_for_report(report.id).await.unwrap();
    assert_eq!(labels, vec![report_label]);

    let fetched: ReportMetadata = store.get(report.id).await.unwrap();
    assert_eq!(fetched.scenario_name, scenario.name);
}

#[tokio::test]
async fn delete_and_not_found() {
    let Some(store) = store().await else { return };
    let scenario = store.insert(&new_scenario(&unique_name("del"))).await.unwrap();

    assert!(store.delete::<ScenarioMetadata>(scenario.id).await.unwrap());
    assert!(!store.delete::<ScenarioMetadata>(scenario.id).await.unwrap());
    assert!(store.find::<ScenarioMetadata>(scenario.id).await.unwrap().is_none());

    let err = store.get::<ScenarioMetadata>(scenario.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id, .. } if id == scenario.id));
}

#[tokio::test]
async fn filter_rejects_undeclared_columns() {
    let Some(store) = store().await else { return };

    let err = store
        .filter::<ScenarioMetadata, _>("name; DROP TABLE users", &"x")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownColumn { .. }));
}

#[tokio::test]
async fn redeploy_creates_nothing_and_verifies() {
    let Some(store) = store().await else { return };

    let result = TableDeployer::new()
        .deploy(store.pool(), store.registry())
        .await
        .unwrap();
    assert_eq!(result.tables_created, 0);
    assert_eq!(result.tables_skipped, 7);

    let tables = TableDeployer::new().list_tables(store.pool()).await.unwrap();
    for table in store.registry().tables() {
        assert!(tables.iter().any(|t| t == table.name), "{}", table.name);
    }

    let verification = SchemaVerifier::new()
        .verify(store.pool(), store.registry())
        .await
        .unwrap();
    assert!(verification.passed, "{}", verification.error_log());
}
