//! 聚合根编排器（AggregateRoot）
//!
//! 封装“加载聚合 → 执行命令 → 记录事件 → 持久化”的标准流程，
//! 以仓储实现（`AggregateRepository`）为依赖，便于在应用层直接调用。
//!
use crate::{
    aggregate::EventSourced,
    domain_event::Metadata,
    entity::Entity,
    error::DomainError,
    persist::AggregateRepository,
};
use std::marker::PhantomData;

/// 面向应用层的聚合根编排器。
///
/// - `A`：聚合类型（实现 `EventSourced`）
/// - `R`：聚合仓储（实现 `AggregateRepository<A>`，可以是快照加速仓储）
pub struct AggregateRoot<A, R>
where
    A: EventSourced,
    R: AggregateRepository<A>,
{
    repo: R,
    _marker: PhantomData<A>,
}

impl<A, R> AggregateRoot<A, R>
where
    A: EventSourced,
    A::Error: From<DomainError>,
    R: AggregateRepository<A>,
{
    /// 创建编排器实例
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _marker: PhantomData,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// 执行聚合命令并返回新产生的事件
    pub async fn execute(
        &self,
        aggregate_id: &A::Id,
        command: A::Command,
    ) -> Result<Vec<A::Event>, A::Error> {
        self.execute_with_metadata(aggregate_id, command, Metadata::default())
            .await
    }

    /// 执行聚合命令：
    /// 1. 若未持久化则创建新聚合；
    /// 2. 执行命令得到新事件；
    /// 3. 记录事件（应用到状态并进入待提交队列）；
    /// 4. 调用仓储持久化。
    pub async fn execute_with_metadata(
        &self,
        aggregate_id: &A::Id,
        command: A::Command,
        metadata: Metadata,
    ) -> Result<Vec<A::Event>, A::Error> {
        let mut aggregate = match self.repo.load(aggregate_id).await? {
            Some(aggregate) => aggregate,
            None => <A as Entity>::new(aggregate_id.clone()),
        };

        let events = aggregate.execute(command)?;
        for event in &events {
            aggregate.record_with_metadata(event.clone(), metadata.clone())?;
        }

        self.repo.save(&mut aggregate).await?;

        Ok(events)
    }
}
