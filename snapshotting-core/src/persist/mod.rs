//! 持久化与事件溯源（persist）
//!
//! - 事件与快照共用的序列化消息（`SerializedMessage`）；
//! - 事件日志读写协议及内存实现（`EventRepository`/`InMemoryEventRepository`）；
//! - 完整重放的聚合仓储（`EventStoreRepository`）；
//! - 快照加速的聚合仓储（`SnapshottingRepository`）。
//!
mod aggregate_repository;
mod event_repository;
mod serialized_message;
mod snapshotting_repository;

pub use aggregate_repository::{AggregateRepository, EventSourcingRepository, EventStoreRepository};
pub(crate) use aggregate_repository::replay;
pub use event_repository::{EventRepository, InMemoryEventRepository};
pub use serialized_message::SerializedMessage;
pub use snapshotting_repository::SnapshottingRepository;
