//! 快照加速的聚合仓储
//!
//! 加载：有快照时从快照重建，只重放快照版本之后的事件；否则退回完整重放。
//! 保存：先用触发策略评估待提交事件的副本，再提交事件；
//! 提交成功且策略命中时，以提交后的版本保存快照。
//! 快照写入失败时事件已经提交，返回 `SnapshotNotSaved`。
//!
use crate::{
    aggregate::{EventSourced, Represent},
    error::{DomainError, DomainResult},
    persist::{AggregateRepository, EventSourcingRepository, replay},
    snapshot::{EventCountTrigger, Snapshot, SnapshotRepository, SnapshotTrigger},
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

pub struct SnapshottingRepository<R, S, T = EventCountTrigger> {
    inner: R,
    snapshots: S,
    trigger: T,
}

impl<R, S> SnapshottingRepository<R, S>
where
    S: SnapshotRepository,
{
    /// 使用默认触发策略（每 20 个事件）
    pub fn new(inner: R, snapshots: S) -> Self {
        Self::with_trigger(inner, snapshots, EventCountTrigger::default())
    }
}

impl<R, S, T> SnapshottingRepository<R, S, T>
where
    S: SnapshotRepository,
    T: SnapshotTrigger,
{
    pub fn with_trigger(inner: R, snapshots: S, trigger: T) -> Self {
        Self {
            inner,
            snapshots,
            trigger,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }
}

#[async_trait]
impl<A, R, S, T> AggregateRepository<A> for SnapshottingRepository<R, S, T>
where
    A: EventSourced + Represent + Clone,
    R: EventSourcingRepository<A>,
    S: SnapshotRepository,
    T: SnapshotTrigger,
{
    async fn load(&self, aggregate_id: &A::Id) -> DomainResult<Option<A>> {
        let Some(snapshot) = self.snapshots.load::<A>(aggregate_id).await? else {
            return self.inner.load(aggregate_id).await;
        };

        let from_version = snapshot.version();
        let mut aggregate = snapshot.into_aggregate();
        let tail = self.inner.load_tail(aggregate_id, from_version).await?;

        debug!(
            aggregate_type = A::TYPE,
            aggregate_id = %aggregate_id,
            snapshot_version = from_version.value(),
            tail = tail.len(),
            "replaying from snapshot"
        );
        replay(&mut aggregate, tail)?;
        Ok(Some(aggregate))
    }

    async fn save(&self, aggregate: &mut A) -> DomainResult<()> {
        let pending = aggregate.pending_events().clone();
        let take_snapshot = self.trigger.should_snapshot(&pending);

        self.inner.save(aggregate).await?;

        if take_snapshot {
            let snapshot = Snapshot::new(aggregate.clone());
            if let Err(err) = self.snapshots.save(&snapshot).await {
                warn!(
                    aggregate_type = A::TYPE,
                    aggregate_id = %aggregate.id(),
                    version = snapshot.version().value(),
                    error = %err,
                    "snapshot not saved after commit"
                );
                return Err(DomainError::SnapshotNotSaved {
                    aggregate_id: aggregate.id().to_string(),
                    version: snapshot.version().value(),
                    source: Box::new(err),
                });
            }
            info!(
                aggregate_type = A::TYPE,
                aggregate_id = %aggregate.id(),
                version = snapshot.version().value(),
                "snapshot taken"
            );
        }
        Ok(())
    }
}
