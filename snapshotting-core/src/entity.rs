//! 实体（Entity）基础抽象
//!
//! 为聚合提供统一的标识（Id）与版本能力，以及仅供本 crate 调用的版本恢复入口。
//!
use crate::value_object::Version;
use std::{fmt::Display, str::FromStr};

/// 版本恢复凭证
///
/// 只能在本 crate 内构造：`Entity::restore_version` 仅由工厂与仓储在重建聚合时调用。
#[derive(Debug)]
pub struct RestoreToken(());

impl RestoreToken {
    pub(crate) fn new() -> Self {
        Self(())
    }
}

/// 具备唯一标识与版本的实体抽象
pub trait Entity: Send + Sync {
    /// 实体标识类型，要求可解析、可显示与可克隆
    type Id: FromStr + Clone + Display + Send + Sync;

    /// 使用给定标识创建实体（版本为 0）
    fn new(aggregate_id: Self::Id) -> Self;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;

    /// 获取当前版本
    fn version(&self) -> Version;

    /// 强制设置版本，仅在从快照或事件流重建时使用
    #[doc(hidden)]
    fn restore_version(&mut self, version: Version, token: RestoreToken);
}
