//! 快照（Snapshot）
//!
//! - `Snapshot`：某一版本上完整重建的聚合；
//! - `SnapshotTrigger`：根据待提交事件决定本次保存是否生成快照；
//! - `SnapshotRepository`：以快照为单位的加载/保存；
//! - `store`：快照的序列化存储后端（内存、SQL）。
//!
mod repository;
pub mod store;
mod trigger;

pub use repository::{SnapshotRepository, SnapshotStoreRepository};
pub use trigger::{EventCountTrigger, SnapshotPolicy, SnapshotTrigger};

use crate::{aggregate::Aggregate, value_object::Version};

/// 聚合在某一版本上的快照，独占其包装的聚合实例
#[derive(Debug, Clone)]
pub struct Snapshot<A> {
    version: Version,
    aggregate: A,
}

impl<A> Snapshot<A>
where
    A: Aggregate,
{
    /// 以聚合当前版本创建快照
    pub fn new(aggregate: A) -> Self {
        Self {
            version: aggregate.version(),
            aggregate,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn aggregate(&self) -> &A {
        &self.aggregate
    }

    pub fn into_aggregate(self) -> A {
        self.aggregate
    }
}
