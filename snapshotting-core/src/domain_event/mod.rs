//! 领域事件（Domain Event）与待提交事件
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`）、消息元数据（`Metadata`），
//! 以及聚合上尚未持久化的事件队列（`PendingEvents`）。

mod domain_event_trait;
mod metadata;
mod pending_events;

pub use domain_event_trait::DomainEvent;
pub use metadata::Metadata;
pub use pending_events::{PendingEvent, PendingEvents};
