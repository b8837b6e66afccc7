//! 聚合仓储
//!
//! `AggregateRepository` 是面向应用层的加载/保存协议；
//! `EventSourcingRepository` 在其上增加“按版本读取增量事件”，供快照仓储组合使用。
//! `EventStoreRepository` 是基于 `EventRepository` 的完整重放实现。
//!
use crate::{
    aggregate::{Aggregate, EventSourced},
    domain_event::DomainEvent,
    entity::RestoreToken,
    error::{DomainError, DomainResult},
    persist::{EventRepository, SerializedMessage},
    value_object::Version,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait AggregateRepository<A>: Send + Sync
where
    A: EventSourced,
{
    /// 加载聚合；不存在时返回 `Ok(None)`
    async fn load(&self, aggregate_id: &A::Id) -> DomainResult<Option<A>>;

    /// 提交聚合上的待提交事件，成功后队列被清空
    async fn save(&self, aggregate: &mut A) -> DomainResult<()>;
}

#[async_trait]
pub trait EventSourcingRepository<A>: AggregateRepository<A>
where
    A: EventSourced,
{
    /// 读取版本严格大于 `from_version` 的事件
    async fn load_tail(
        &self,
        aggregate_id: &A::Id,
        from_version: Version,
    ) -> DomainResult<Vec<A::Event>>;
}

#[async_trait]
impl<A, T> AggregateRepository<A> for Arc<T>
where
    A: EventSourced,
    T: AggregateRepository<A> + ?Sized,
{
    async fn load(&self, aggregate_id: &A::Id) -> DomainResult<Option<A>> {
        (**self).load(aggregate_id).await
    }

    async fn save(&self, aggregate: &mut A) -> DomainResult<()> {
        (**self).save(aggregate).await
    }
}

#[async_trait]
impl<A, T> EventSourcingRepository<A> for Arc<T>
where
    A: EventSourced,
    T: EventSourcingRepository<A> + ?Sized,
{
    async fn load_tail(
        &self,
        aggregate_id: &A::Id,
        from_version: Version,
    ) -> DomainResult<Vec<A::Event>> {
        (**self).load_tail(aggregate_id, from_version).await
    }
}

/// 将事件依次应用到聚合上，要求版本紧接当前版本
pub(crate) fn replay<A, I>(aggregate: &mut A, events: I) -> DomainResult<()>
where
    A: Aggregate,
    I: IntoIterator<Item = A::Event>,
{
    for event in events {
        let expected = aggregate.version().next();
        let actual = event.aggregate_version();
        if actual != expected {
            return Err(DomainError::VersionConflict {
                expected: expected.value(),
                actual: actual.value(),
            });
        }
        aggregate.apply(&event);
        aggregate.restore_version(actual, RestoreToken::new());
    }
    Ok(())
}

/// 基于事件存储的聚合仓储：加载时重放完整事件流
pub struct EventStoreRepository<E> {
    event_repo: E,
}

impl<E> EventStoreRepository<E>
where
    E: EventRepository,
{
    pub fn new(event_repo: E) -> Self {
        Self { event_repo }
    }

    pub fn event_repo(&self) -> &E {
        &self.event_repo
    }

    fn decode<A: Aggregate>(messages: Vec<SerializedMessage>) -> DomainResult<Vec<A::Event>> {
        messages.iter().map(|m| m.to_event::<A::Event>()).collect()
    }
}

#[async_trait]
impl<A, E> AggregateRepository<A> for EventStoreRepository<E>
where
    A: EventSourced,
    E: EventRepository,
{
    async fn load(&self, aggregate_id: &A::Id) -> DomainResult<Option<A>> {
        let messages = self
            .event_repo
            .get_events::<A>(&aggregate_id.to_string())
            .await?;

        if messages.is_empty() {
            return Ok(None);
        }

        debug!(
            aggregate_type = A::TYPE,
            aggregate_id = %aggregate_id,
            events = messages.len(),
            "full replay"
        );

        let mut aggregate = A::new(aggregate_id.clone());
        replay(&mut aggregate, Self::decode::<A>(messages)?)?;
        Ok(Some(aggregate))
    }

    async fn save(&self, aggregate: &mut A) -> DomainResult<()> {
        if aggregate.pending_events().is_empty() {
            return Ok(());
        }

        let aggregate_id = aggregate.id().to_string();
        let messages = aggregate
            .pending_events()
            .iter()
            .map(|event| SerializedMessage::from_pending(&aggregate_id, event))
            .collect::<DomainResult<Vec<_>>>()?;

        self.event_repo.save::<A>(messages).await?;
        aggregate.take_pending_events();
        Ok(())
    }
}

#[async_trait]
impl<A, E> EventSourcingRepository<A> for EventStoreRepository<E>
where
    A: EventSourced,
    E: EventRepository,
{
    async fn load_tail(
        &self,
        aggregate_id: &A::Id,
        from_version: Version,
    ) -> DomainResult<Vec<A::Event>> {
        let messages = self
            .event_repo
            .get_last_events::<A>(&aggregate_id.to_string(), from_version)
            .await?;
        Self::decode::<A>(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::fixtures::{Counter, CounterEvent, counter_with};
    use crate::persist::InMemoryEventRepository;

    #[tokio::test]
    async fn save_then_full_replay() -> anyhow::Result<()> {
        let repo = EventStoreRepository::new(InMemoryEventRepository::new());
        let mut counter = counter_with("c-1", [1, 2, 3]);
        repo.save(&mut counter).await?;
        assert!(counter.pending_events().is_empty());

        let loaded: Counter = repo.load(&"c-1".to_string()).await?.unwrap();
        assert_eq!(loaded.value, 6);
        assert_eq!(loaded.version(), Version::from_value(3));
        assert!(loaded.pending_events().is_empty());

        let tail = EventSourcingRepository::<Counter>::load_tail(
            &repo,
            &"c-1".to_string(),
            Version::from_value(1),
        )
        .await?;
        assert_eq!(tail.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn saving_without_pending_events_is_noop() -> anyhow::Result<()> {
        let repo = EventStoreRepository::new(InMemoryEventRepository::new());
        let mut counter = Counter::new("c-1".to_string());
        repo.save(&mut counter).await?;

        let loaded: Option<Counter> = repo.load(&"c-1".to_string()).await?;
        assert!(loaded.is_none());
        Ok(())
    }

    #[test]
    fn replay_rejects_version_gap() {
        let mut counter = Counter::new("c-1".to_string());
        let events = vec![
            CounterEvent::Incremented {
                id: "e-1".into(),
                aggregate_version: Version::from_value(1),
                by: 1,
            },
            CounterEvent::Incremented {
                id: "e-3".into(),
                aggregate_version: Version::from_value(3),
                by: 1,
            },
        ];

        let err = replay(&mut counter, events).unwrap_err();
        assert!(matches!(
            err,
            DomainError::VersionConflict {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(counter.value, 1);
    }
}
