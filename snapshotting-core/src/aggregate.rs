//! 聚合（Aggregate）抽象
//!
//! 约束一个聚合的核心行为：
//! - `execute` 将命令转换为事件（不改变状态）；
//! - `apply` 将事件投影到状态（改变状态）；
//! - `EventSourced` 维护尚未提交的事件队列；
//! - `Assemble`/`Represent` 让聚合可以从快照状态重建、也可以导出快照状态。
//!
use crate::domain_event::{DomainEvent, Metadata, PendingEvent, PendingEvents};
use crate::entity::{Entity, RestoreToken};
use crate::error::{DomainError, DomainResult};
use serde::{Serialize, de::DeserializeOwned};
use std::error::Error;

/// 聚合根接口
pub trait Aggregate: Entity + Default + Send + Sync + 'static {
    /// 聚合类型名，同时作为快照消息的类型标识
    const TYPE: &'static str;

    /// 该聚合支持的命令类型
    type Command: Send;
    /// 该聚合产生的领域事件类型
    type Event: DomainEvent;
    /// 命令执行或持久化环节的错误类型
    type Error: Error + Send + Sync + 'static;

    /// 执行命令，返回产生的事件列表
    fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// 应用事件，更新聚合状态
    fn apply(&mut self, event: &Self::Event);
}

/// 事件溯源聚合：持有尚未提交的事件队列
pub trait EventSourced: Aggregate {
    fn pending_events(&self) -> &PendingEvents<Self::Event>;

    fn pending_events_mut(&mut self) -> &mut PendingEvents<Self::Event>;

    /// 记录一条新事件：应用到状态、推进版本并加入待提交队列
    fn record(&mut self, event: Self::Event) -> DomainResult<()> {
        self.record_with_metadata(event, Metadata::default())
    }

    fn record_with_metadata(&mut self, event: Self::Event, metadata: Metadata) -> DomainResult<()> {
        let expected = self.version().next();
        let actual = event.aggregate_version();
        if actual != expected {
            return Err(DomainError::VersionConflict {
                expected: expected.value(),
                actual: actual.value(),
            });
        }

        self.apply(&event);
        self.restore_version(actual, RestoreToken::new());
        self.pending_events_mut()
            .push(PendingEvent::new(event, metadata));
        Ok(())
    }

    /// 取出并清空待提交事件
    fn take_pending_events(&mut self) -> PendingEvents<Self::Event> {
        std::mem::take(self.pending_events_mut())
    }
}

/// 可从快照状态（值对象）组装的聚合
pub trait Assemble: Aggregate {
    /// 快照状态值对象
    type State: Serialize + DeserializeOwned + Send + Sync;

    /// 用快照状态初始化聚合内部状态（版本由调用方恢复）
    fn assemble(&mut self, state: Self::State) -> DomainResult<()>;
}

/// 可导出快照状态的聚合
pub trait Represent: Assemble {
    fn represent(&self) -> Self::State;
}
