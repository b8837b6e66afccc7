//! 事件仓储（EventRepository）
//!
//! 事件日志的最小读写协议，以及用于测试与示例的内存实现。
//!
use crate::{
    aggregate::Aggregate,
    error::{DomainError, DomainResult},
    persist::SerializedMessage,
    value_object::Version,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// 读取聚合的全部事件（按版本升序）
    async fn get_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
    ) -> DomainResult<Vec<SerializedMessage>>;

    /// 读取版本严格大于 `last_version` 的事件（按版本升序）
    async fn get_last_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
        last_version: Version,
    ) -> DomainResult<Vec<SerializedMessage>>;

    /// 追加事件；版本必须紧接已有事件，否则返回 `VersionConflict`
    async fn save<A: Aggregate>(&self, events: Vec<SerializedMessage>) -> DomainResult<()>;
}

#[async_trait]
impl<T> EventRepository for Arc<T>
where
    T: EventRepository + ?Sized,
{
    async fn get_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
    ) -> DomainResult<Vec<SerializedMessage>> {
        (**self).get_events::<A>(aggregate_id).await
    }

    async fn get_last_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
        last_version: Version,
    ) -> DomainResult<Vec<SerializedMessage>> {
        (**self)
            .get_last_events::<A>(aggregate_id, last_version)
            .await
    }

    async fn save<A: Aggregate>(&self, events: Vec<SerializedMessage>) -> DomainResult<()> {
        (**self).save::<A>(events).await
    }
}

/// 内存事件仓储，按 (聚合类型, 聚合 ID) 划分事件流
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: DashMap<(String, String), Vec<SerializedMessage>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn key<A: Aggregate>(aggregate_id: &str) -> (String, String) {
        (A::TYPE.to_string(), aggregate_id.to_string())
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn get_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
    ) -> DomainResult<Vec<SerializedMessage>> {
        Ok(self
            .streams
            .get(&Self::key::<A>(aggregate_id))
            .map(|stream| stream.value().clone())
            .unwrap_or_default())
    }

    async fn get_last_events<A: Aggregate>(
        &self,
        aggregate_id: &str,
        last_version: Version,
    ) -> DomainResult<Vec<SerializedMessage>> {
        Ok(self
            .streams
            .get(&Self::key::<A>(aggregate_id))
            .map(|stream| {
                stream
                    .iter()
                    .filter(|m| m.version() > last_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save<A: Aggregate>(&self, events: Vec<SerializedMessage>) -> DomainResult<()> {
        let Some(first) = events.first() else {
            return Ok(());
        };
        let aggregate_id = first.aggregate_id().to_string();

        if events.iter().any(|m| m.aggregate_id() != aggregate_id) {
            return Err(DomainError::EventRepository {
                reason: "events of one save must belong to a single aggregate".to_string(),
            });
        }

        // entry 持有分片写锁，检查与追加在同一临界区内完成
        let mut stream = self.streams.entry(Self::key::<A>(&aggregate_id)).or_default();
        let mut expected = stream.last().map(|m| m.version()).unwrap_or_default().next();
        for message in &events {
            if message.version() != expected {
                return Err(DomainError::VersionConflict {
                    expected: expected.value(),
                    actual: message.version().value(),
                });
            }
            expected = expected.next();
        }

        debug!(
            aggregate_type = A::TYPE,
            aggregate_id = %aggregate_id,
            count = events.len(),
            "events appended"
        );
        stream.extend(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::EventSourced;
    use crate::fixtures::{Counter, counter_with};

    fn messages_of(counter: &Counter) -> Vec<SerializedMessage> {
        counter
            .pending_events()
            .iter()
            .map(|e| SerializedMessage::from_pending("c-1", e).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn tail_is_strictly_after_version() -> anyhow::Result<()> {
        let repo = InMemoryEventRepository::new();
        let counter = counter_with("c-1", [1, 2, 3, 4]);
        repo.save::<Counter>(messages_of(&counter)).await?;

        let all = repo.get_events::<Counter>("c-1").await?;
        assert_eq!(all.len(), 4);

        let tail = repo
            .get_last_events::<Counter>("c-1", Version::from_value(2))
            .await?;
        let versions: Vec<usize> = tail.iter().map(|m| m.version().value()).collect();
        assert_eq!(versions, vec![3, 4]);

        let none = repo
            .get_last_events::<Counter>("c-1", Version::from_value(4))
            .await?;
        assert!(none.is_empty());
        assert!(repo.get_events::<Counter>("other").await?.is_empty());
        Ok(())
    }

    // 重复提交同一批版本视为并发冲突
    #[tokio::test]
    async fn non_contiguous_save_conflicts() -> anyhow::Result<()> {
        let repo = InMemoryEventRepository::new();
        let counter = counter_with("c-1", [1, 2]);
        repo.save::<Counter>(messages_of(&counter)).await?;

        let err = repo
            .save::<Counter>(messages_of(&counter))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::VersionConflict {
                expected: 3,
                actual: 1
            }
        ));
        assert_eq!(repo.get_events::<Counter>("c-1").await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn mixed_aggregates_rejected() {
        let repo = InMemoryEventRepository::new();
        let mut messages = messages_of(&counter_with("c-1", [1]));
        let other = counter_with("c-2", [1]);
        let first = other.pending_events().iter().next().unwrap();
        messages.push(SerializedMessage::from_pending("c-2", first).unwrap());

        let err = repo.save::<Counter>(messages).await.unwrap_err();
        assert!(matches!(err, DomainError::EventRepository { .. }));
    }
}
