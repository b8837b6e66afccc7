//! 快照仓储
//!
//! 组合 `SnapshotStore` 与 `AggregateFactory`，以 `Snapshot` 为单位加载与保存。
//!
use super::Snapshot;
use super::store::SnapshotStore;
use crate::{
    aggregate::{Aggregate, Assemble, Represent},
    error::{DomainError, DomainResult},
    factory::{AggregateFactory, DefaultAggregateFactory},
    persist::SerializedMessage,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// 加载最新快照；不存在时返回 `Ok(None)`
    async fn load<A: Assemble>(&self, aggregate_id: &A::Id) -> DomainResult<Option<Snapshot<A>>>;

    /// 以快照版本追加一行快照
    async fn save<A: Represent>(&self, snapshot: &Snapshot<A>) -> DomainResult<()>;
}

#[async_trait]
impl<T> SnapshotRepository for Arc<T>
where
    T: SnapshotRepository + ?Sized,
{
    async fn load<A: Assemble>(&self, aggregate_id: &A::Id) -> DomainResult<Option<Snapshot<A>>> {
        (**self).load::<A>(aggregate_id).await
    }

    async fn save<A: Represent>(&self, snapshot: &Snapshot<A>) -> DomainResult<()> {
        (**self).save::<A>(snapshot).await
    }
}

/// 绑定单一聚合类型的快照仓储
#[derive(Debug)]
pub struct SnapshotStoreRepository<S, F = DefaultAggregateFactory> {
    store: S,
    factory: F,
    aggregate_type: String,
}

impl<S> SnapshotStoreRepository<S>
where
    S: SnapshotStore,
{
    pub fn new(store: S, aggregate_type: impl Into<String>) -> Self {
        Self {
            store,
            factory: DefaultAggregateFactory,
            aggregate_type: aggregate_type.into(),
        }
    }

    /// 以 `A::TYPE` 作为仓储的聚合类型
    pub fn for_aggregate<A: Aggregate>(store: S) -> Self {
        Self::new(store, A::TYPE)
    }
}

impl<S, F> SnapshotStoreRepository<S, F>
where
    S: SnapshotStore,
    F: AggregateFactory,
{
    /// 替换聚合工厂
    pub fn with_factory<G: AggregateFactory>(self, factory: G) -> SnapshotStoreRepository<S, G> {
        SnapshotStoreRepository {
            store: self.store,
            factory,
            aggregate_type: self.aggregate_type,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    /// 读取最新快照的原始 payload
    pub async fn load_payload(&self, aggregate_id: &str) -> DomainResult<Option<Value>> {
        match self.store.load_latest(aggregate_id).await {
            Ok(message) => Ok(Some(message.payload().clone())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn ensure_type<A: Aggregate>(&self) -> DomainResult<()> {
        if A::TYPE != self.aggregate_type {
            return Err(DomainError::Repository {
                reason: format!(
                    "snapshot repository for {} cannot handle aggregate {}",
                    self.aggregate_type,
                    A::TYPE
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<S, F> SnapshotRepository for SnapshotStoreRepository<S, F>
where
    S: SnapshotStore,
    F: AggregateFactory,
{
    async fn load<A: Assemble>(&self, aggregate_id: &A::Id) -> DomainResult<Option<Snapshot<A>>> {
        self.ensure_type::<A>()?;

        let aggregate_id = aggregate_id.to_string();
        let message = match self.store.load_latest(&aggregate_id).await {
            Ok(message) => message,
            Err(err) if err.is_not_found() => {
                debug!(aggregate_type = A::TYPE, aggregate_id = %aggregate_id, "no snapshot");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let aggregate: A = self.factory.create(&message)?;
        Ok(Some(Snapshot::new(aggregate)))
    }

    async fn save<A: Represent>(&self, snapshot: &Snapshot<A>) -> DomainResult<()> {
        self.ensure_type::<A>()?;

        let aggregate = snapshot.aggregate();
        let aggregate_id = aggregate.id().to_string();
        let message = SerializedMessage::builder()
            .aggregate_id(aggregate_id.clone())
            .version(snapshot.version())
            .payload(serde_json::to_value(aggregate.represent())?)
            .message_type(A::TYPE)
            .build();

        self.store.append(&aggregate_id, message).await
    }
}
