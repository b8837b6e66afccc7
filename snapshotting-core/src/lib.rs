//! 快照加速的事件溯源仓储（snapshotting-core）
//!
//! 在事件溯源的聚合仓储之上周期性地保存聚合状态快照，
//! 使加载聚合时只需重放快照之后的增量事件，而不必重放完整历史：
//! - 聚合（`aggregate`）与实体（`entity`）建模，以及版本值对象（`value_object`）
//! - 领域事件与待提交事件队列（`domain_event`）
//! - 事件/快照共用的序列化消息与事件溯源仓储（`persist`）
//! - 快照触发策略、快照仓储与快照存储后端（`snapshot`）
//! - 从快照载荷重建聚合的工厂（`factory`）
//!
//! 典型用法：
//! 1. 使用 `#[aggregate]`/`#[event]` 定义聚合与事件，并实现 `Assemble`/`Represent`；
//! 2. 选择事件仓储（如 `InMemoryEventRepository`）构建 `EventStoreRepository`；
//! 3. 选择快照存储（内存或 SQL）构建 `SnapshotStoreRepository`；
//! 4. 用 `SnapshottingRepository` 组合两者，并交给 `AggregateRoot` 编排命令。
//!
pub mod aggregate;
pub mod aggregate_root;
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod factory;
pub mod persist;
pub mod serializer;
pub mod snapshot;
pub mod value_object;

#[cfg(test)]
mod fixtures;

// 允许在本 crate 内部通过 ::snapshotting_core 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::snapshotting_core 路径。
extern crate self as snapshotting_core;
