//! 快照触发策略
//!
use crate::{
    domain_event::{DomainEvent, PendingEvents},
    error::{DomainError, DomainResult},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 根据一次保存中的待提交事件判断是否需要生成快照
///
/// 实现必须是纯函数：只读取事件副本，不修改聚合。
pub trait SnapshotTrigger: Send + Sync {
    fn should_snapshot<E: DomainEvent>(&self, pending: &PendingEvents<E>) -> bool;
}

impl<T> SnapshotTrigger for Arc<T>
where
    T: SnapshotTrigger,
{
    fn should_snapshot<E: DomainEvent>(&self, pending: &PendingEvents<E>) -> bool {
        (**self).should_snapshot(pending)
    }
}

impl<T> SnapshotTrigger for &T
where
    T: SnapshotTrigger,
{
    fn should_snapshot<E: DomainEvent>(&self, pending: &PendingEvents<E>) -> bool {
        (**self).should_snapshot(pending)
    }
}

/// 按事件计数触发：批次中任一计数事件的版本落在 `event_count` 的整数倍上即触发
///
/// 标记为 `skips_snapshot` 的事件不参与判断。整个批次都会被扫描，
/// 因此一次提交跨过阈值也能触发。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct EventCountTrigger {
    event_count: usize,
}

impl EventCountTrigger {
    pub const DEFAULT_EVENT_COUNT: usize = 20;

    pub fn new(event_count: usize) -> DomainResult<Self> {
        if event_count == 0 {
            return Err(DomainError::InvalidValue {
                reason: "snapshot event count must be positive".to_string(),
            });
        }
        Ok(Self { event_count })
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }
}

impl TryFrom<usize> for EventCountTrigger {
    type Error = DomainError;

    fn try_from(event_count: usize) -> DomainResult<Self> {
        Self::new(event_count)
    }
}

impl From<EventCountTrigger> for usize {
    fn from(trigger: EventCountTrigger) -> Self {
        trigger.event_count
    }
}

impl Default for EventCountTrigger {
    fn default() -> Self {
        Self {
            event_count: Self::DEFAULT_EVENT_COUNT,
        }
    }
}

impl SnapshotTrigger for EventCountTrigger {
    fn should_snapshot<E: DomainEvent>(&self, pending: &PendingEvents<E>) -> bool {
        pending
            .iter()
            .filter(|event| !event.payload.skips_snapshot())
            .any(|event| event.version().is_multiple_of(self.event_count))
    }
}

/// 可配置的快照策略，反序列化时拒绝为 0 的阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    Never,
    EventCount(EventCountTrigger),
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        SnapshotPolicy::EventCount(EventCountTrigger::default())
    }
}

impl SnapshotTrigger for SnapshotPolicy {
    fn should_snapshot<E: DomainEvent>(&self, pending: &PendingEvents<E>) -> bool {
        match self {
            SnapshotPolicy::Never => false,
            SnapshotPolicy::EventCount(trigger) => trigger.should_snapshot(pending),
        }
    }
}
