//! 聚合工厂（AggregateFactory）
//!
//! 从快照消息重建聚合：创建零值聚合、用反序列化的状态组装，
//! 再通过版本恢复入口把版本设为快照版本。
//!
use crate::{
    aggregate::Assemble,
    entity::RestoreToken,
    error::{DomainError, DomainResult},
    persist::SerializedMessage,
};

pub trait AggregateFactory: Send + Sync {
    fn create<A: Assemble>(&self, message: &SerializedMessage) -> DomainResult<A>;
}

/// 默认工厂：按 `A::TYPE` 校验消息类型，经 `Assemble` 组装
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAggregateFactory;

impl AggregateFactory for DefaultAggregateFactory {
    fn create<A: Assemble>(&self, message: &SerializedMessage) -> DomainResult<A> {
        if message.message_type() != A::TYPE {
            return Err(DomainError::Factory {
                reason: format!(
                    "cannot create aggregate {} from snapshot of type {}",
                    A::TYPE,
                    message.message_type()
                ),
            });
        }

        let id: A::Id =
            message
                .aggregate_id()
                .parse()
                .map_err(|_| DomainError::InvalidIdentifier {
                    reason: format!("cannot parse aggregate id {}", message.aggregate_id()),
                })?;

        let state: A::State = message
            .decode_payload()
            .map_err(|err| DomainError::Factory {
                reason: format!("cannot deserialize {} state: {err}", A::TYPE),
            })?;

        let mut aggregate = A::new(id);
        aggregate
            .assemble(state)
            .map_err(|err| DomainError::Factory {
                reason: format!("cannot assemble {}: {err}", A::TYPE),
            })?;
        aggregate.restore_version(message.version(), RestoreToken::new());

        Ok(aggregate)
    }
}

impl<T> AggregateFactory for std::sync::Arc<T>
where
    T: AggregateFactory,
{
    fn create<A: Assemble>(&self, message: &SerializedMessage) -> DomainResult<A> {
        (**self).create(message)
    }
}
