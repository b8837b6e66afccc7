//! 使用快照加速仓储的银行账户示例
//!
//! 运行：`RUST_LOG=snapshotting_core=debug cargo run --example snapshotting_repository`
//!
use serde::{Deserialize, Serialize};
use snapshotting_core::aggregate::{Aggregate, Assemble, Represent};
use snapshotting_core::aggregate_root::AggregateRoot;
use snapshotting_core::entity::Entity;
use snapshotting_core::error::{DomainError, DomainResult};
use snapshotting_core::persist::{
    AggregateRepository, EventStoreRepository, InMemoryEventRepository, SnapshottingRepository,
};
use snapshotting_core::snapshot::store::{InMemorySnapshotStore, SnapshotStore};
use snapshotting_core::snapshot::{EventCountTrigger, SnapshotPolicy, SnapshotStoreRepository};
use snapshotting_macros::{aggregate, event};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use ulid::Ulid;

#[derive(Debug, thiserror::Error)]
enum AccountError {
    #[error("account not opened")]
    NotOpened,
    #[error("account already opened")]
    AlreadyOpened,
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug)]
enum AccountCommand {
    Open { owner: String },
    Deposit { amount: i64 },
    Withdraw { amount: i64 },
}

#[event(id = String)]
enum AccountEvent {
    #[event(event_type = "account.opened")]
    Opened { owner: String },
    #[event(event_type = "account.deposited")]
    Deposited { amount: i64 },
    #[event(event_type = "account.withdrawn")]
    Withdrawn { amount: i64 },
}

#[aggregate(id = String, event = AccountEvent)]
struct Account {
    owner: Option<String>,
    balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccountSnapshot {
    owner: Option<String>,
    balance: i64,
}

impl Aggregate for Account {
    const TYPE: &'static str = "account";
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = AccountError;

    fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let id = Ulid::new().to_string();
        let aggregate_version = self.version().next();
        let event = match command {
            AccountCommand::Open { owner } => {
                if self.owner.is_some() {
                    return Err(AccountError::AlreadyOpened);
                }
                AccountEvent::Opened {
                    id,
                    aggregate_version,
                    owner,
                }
            }
            AccountCommand::Deposit { amount } => {
                self.owner.as_ref().ok_or(AccountError::NotOpened)?;
                AccountEvent::Deposited {
                    id,
                    aggregate_version,
                    amount,
                }
            }
            AccountCommand::Withdraw { amount } => {
                self.owner.as_ref().ok_or(AccountError::NotOpened)?;
                if amount > self.balance {
                    return Err(AccountError::InsufficientFunds {
                        balance: self.balance,
                        requested: amount,
                    });
                }
                AccountEvent::Withdrawn {
                    id,
                    aggregate_version,
                    amount,
                }
            }
        };
        Ok(vec![event])
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened { owner, .. } => self.owner = Some(owner.clone()),
            AccountEvent::Deposited { amount, .. } => self.balance += amount,
            AccountEvent::Withdrawn { amount, .. } => self.balance -= amount,
        }
    }
}

impl Assemble for Account {
    type State = AccountSnapshot;

    fn assemble(&mut self, state: Self::State) -> DomainResult<()> {
        self.owner = state.owner;
        self.balance = state.balance;
        Ok(())
    }
}

impl Represent for Account {
    fn represent(&self) -> Self::State {
        AccountSnapshot {
            owner: self.owner.clone(),
            balance: self.balance,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let events = Arc::new(InMemoryEventRepository::new());
    let snapshots = Arc::new(InMemorySnapshotStore::new());
    let repo = SnapshottingRepository::with_trigger(
        EventStoreRepository::new(Arc::clone(&events)),
        SnapshotStoreRepository::for_aggregate::<Account>(Arc::clone(&snapshots)),
        SnapshotPolicy::EventCount(EventCountTrigger::new(10)?),
    );
    let root = AggregateRoot::<Account, _>::new(repo);

    let id = "acc-001".to_string();
    root.execute(
        &id,
        AccountCommand::Open {
            owner: "alice".into(),
        },
    )
    .await?;
    for amount in 1..=24 {
        root.execute(&id, AccountCommand::Deposit { amount }).await?;
    }
    root.execute(&id, AccountCommand::Withdraw { amount: 100 })
        .await?;

    if let Err(err) = root
        .execute(&id, AccountCommand::Withdraw { amount: 10_000 })
        .await
    {
        tracing::warn!(error = %err, "command rejected");
    }

    let latest = snapshots.load_latest(&id).await?;
    tracing::info!(
        version = latest.version().value(),
        snapshots = snapshots.snapshot_count(&id)?,
        "latest snapshot"
    );

    let account: Account = root
        .repository()
        .load(&id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("account {id} not found"))?;
    tracing::info!(
        owner = ?account.owner,
        balance = account.balance,
        version = %account.version(),
        "account loaded"
    );
    Ok(())
}
