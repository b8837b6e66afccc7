#![cfg(feature = "sqlite")]

mod common;

use common::{Account, AccountCommand, deposit_many, tracing_init};
use snapshotting_core::aggregate_root::AggregateRoot;
use snapshotting_core::entity::Entity;
use snapshotting_core::persist::{
    AggregateRepository, EventStoreRepository, InMemoryEventRepository, SnapshottingRepository,
};
use snapshotting_core::snapshot::store::sql::SnapshotStoreConfig;
use snapshotting_core::snapshot::store::sql::sqlite::SqliteSnapshotStore;
use snapshotting_core::snapshot::store::{IdentifierEncoding, SnapshotStore};
use snapshotting_core::snapshot::{EventCountTrigger, SnapshotStoreRepository};
use snapshotting_core::value_object::Version;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

async fn sqlite_store(config: SnapshotStoreConfig) -> anyhow::Result<Arc<SqliteSnapshotStore>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = SqliteSnapshotStore::new(pool, config);
    store.configure_schema().await?;
    Ok(Arc::new(store))
}

// 通过 AggregateRoot 执行命令，快照写入 SQLite 后可被新的仓储实例读取
#[tokio::test]
async fn commands_snapshot_into_sqlite() -> anyhow::Result<()> {
    tracing_init();
    let events = Arc::new(InMemoryEventRepository::new());
    let store = sqlite_store(SnapshotStoreConfig {
        table_name: "account_snapshots".to_string(),
        ..Default::default()
    })
    .await?;

    let root = AggregateRoot::<Account, _>::new(SnapshottingRepository::with_trigger(
        EventStoreRepository::new(Arc::clone(&events)),
        SnapshotStoreRepository::for_aggregate::<Account>(Arc::clone(&store)),
        EventCountTrigger::new(5)?,
    ));

    let id = "acc-1".to_string();
    for amount in 1..=12 {
        root.execute(&id, AccountCommand::Deposit { amount }).await?;
    }
    root.execute(&id, AccountCommand::Withdraw { amount: 8 })
        .await?;

    let latest = store.load_latest(&id).await?;
    assert_eq!(latest.version(), Version::from_value(10));
    let previous = store.load(&id, 1).await?;
    assert_eq!(previous.version(), Version::from_value(5));
    assert!(store.load(&id, 2).await.unwrap_err().is_not_found());

    let reopened = SnapshottingRepository::new(
        EventStoreRepository::new(Arc::clone(&events)),
        SnapshotStoreRepository::for_aggregate::<Account>(Arc::clone(&store)),
    );
    let loaded: Account = reopened.load(&id).await?.unwrap();
    assert_eq!(loaded.version(), Version::from_value(13));
    assert_eq!(loaded.balance, (1..=12).sum::<i64>() - 8);
    Ok(())
}

#[tokio::test]
async fn binary_identifiers_round_trip() -> anyhow::Result<()> {
    let store = sqlite_store(SnapshotStoreConfig {
        identifier_encoding: IdentifierEncoding::Binary,
        ..Default::default()
    })
    .await?;
    let repo = SnapshottingRepository::with_trigger(
        EventStoreRepository::new(InMemoryEventRepository::new()),
        SnapshotStoreRepository::for_aggregate::<Account>(Arc::clone(&store)),
        EventCountTrigger::new(3)?,
    );

    let id = uuid::Uuid::new_v4().to_string();
    let mut account = Account::new(id.clone());
    deposit_many(&mut account, 3);
    repo.save(&mut account).await?;

    let latest = store.load_latest(&id).await?;
    assert_eq!(latest.aggregate_id(), id);
    assert_eq!(latest.version(), Version::from_value(3));

    let err = store.load_latest("not-a-uuid").await.unwrap_err();
    assert!(matches!(
        err,
        snapshotting_core::error::DomainError::InvalidIdentifier { .. }
    ));
    Ok(())
}
