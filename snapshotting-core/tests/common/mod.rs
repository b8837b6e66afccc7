#![allow(dead_code)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snapshotting_core::aggregate::{Aggregate, Assemble, EventSourced, Represent};
use snapshotting_core::entity::Entity;
use snapshotting_core::error::{DomainError, DomainResult};
use snapshotting_core::persist::{EventRepository, InMemoryEventRepository, SerializedMessage};
use snapshotting_core::value_object::Version;
use snapshotting_macros::{aggregate, event};
use std::sync::atomic::{AtomicUsize, Ordering};

#[event(id = String)]
pub enum AccountEvent {
    Deposited { amount: i64 },
    Withdrawn { amount: i64 },
    #[event(skip_snapshot)]
    Viewed {},
}

#[aggregate(id = String, event = AccountEvent)]
pub struct Account {
    pub balance: i64,
    pub views: u32,
}

#[derive(Debug)]
pub enum AccountCommand {
    Deposit { amount: i64 },
    Withdraw { amount: i64 },
    View,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: i64,
    pub views: u32,
}

impl Aggregate for Account {
    const TYPE: &'static str = "account";
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = DomainError;

    fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let id = ulid::Ulid::new().to_string();
        let aggregate_version = self.version().next();
        match command {
            AccountCommand::Deposit { amount } => Ok(vec![AccountEvent::Deposited {
                id,
                aggregate_version,
                amount,
            }]),
            AccountCommand::Withdraw { amount } => {
                if amount > self.balance {
                    return Err(DomainError::InvalidCommand {
                        reason: "insufficient balance".into(),
                    });
                }
                Ok(vec![AccountEvent::Withdrawn {
                    id,
                    aggregate_version,
                    amount,
                }])
            }
            AccountCommand::View => Ok(vec![AccountEvent::Viewed {
                id,
                aggregate_version,
            }]),
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Deposited { amount, .. } => self.balance += amount,
            AccountEvent::Withdrawn { amount, .. } => self.balance -= amount,
            AccountEvent::Viewed { .. } => self.views += 1,
        }
    }
}

impl Assemble for Account {
    type State = AccountState;

    fn assemble(&mut self, state: Self::State) -> DomainResult<()> {
        self.balance = state.balance;
        self.views = state.views;
        Ok(())
    }
}

impl Represent for Account {
    fn represent(&self) -> Self::State {
        AccountState {
            balance: self.balance,
            views: self.views,
        }
    }
}

/// 执行一条命令并记录其事件
pub fn run(account: &mut Account, command: AccountCommand) {
    for event in account.execute(command).unwrap() {
        account.record(event).unwrap();
    }
}

/// 记录 `count` 次存款，第 n 次存入 n
pub fn deposit_many(account: &mut Account, count: usize) {
    let start = account.version().value() as i64;
    for n in 1..=count as i64 {
        run(account, AccountCommand::Deposit { amount: start + n });
    }
}

pub fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 统计完整读取与增量读取次数的事件仓储
#[derive(Debug, Default)]
pub struct CountingEventRepository {
    inner: InMemoryEventRepository,
    full_reads: AtomicUsize,
    tail_reads: AtomicUsize,
}

impl CountingEventRepository {
    pub fn full_reads(&self) -> usize {
        self.full_reads.load(Ordering::SeqCst)
    }

    pub fn tail_reads(&self) -> usize {
        self.tail_reads.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.full_reads.store(0, Ordering::SeqCst);
        self.tail_reads.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventRepository for CountingEventRepository {
    async fn get_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
    ) -> DomainResult<Vec<SerializedMessage>> {
        self.full_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_events::<A>(aggregate_id).await
    }

    async fn get_last_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
        last_version: Version,
    ) -> DomainResult<Vec<SerializedMessage>> {
        self.tail_reads.fetch_add(1, Ordering::SeqCst);
        self.inner
            .get_last_events::<A>(aggregate_id, last_version)
            .await
    }

    async fn save<A: Aggregate>(&self, events: Vec<SerializedMessage>) -> DomainResult<()> {
        self.inner.save::<A>(events).await
    }
}
