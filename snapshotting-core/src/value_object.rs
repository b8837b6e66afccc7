//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象。这里提供聚合版本号 `Version`。
//!
use serde::{Deserialize, Serialize};
use std::fmt;

/// 聚合版本号
///
/// 表示聚合已应用的事件数量：新建聚合为 0，第一条事件产生版本 1。
/// 事件携带的版本即其提交后聚合所处的版本。
///
/// # 示例
///
/// ```
/// use snapshotting_core::value_object::Version;
///
/// let v1 = Version::new();
/// assert_eq!(v1.value(), 0);
/// assert!(v1.is_new());
///
/// let v2 = v1.next();
/// assert_eq!(v2.value(), 1);
/// assert!(v2 > v1);
/// ```
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct Version(usize);

impl Version {
    /// 创建初始版本（版本号为 0）
    pub const fn new() -> Self {
        Self(0)
    }

    /// 从值创建版本号
    pub const fn from_value(value: usize) -> Self {
        Self(value)
    }

    /// 获取下一个版本号
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// 获取版本号的值
    pub const fn value(&self) -> usize {
        self.0
    }

    /// 检查是否为初始版本
    pub fn is_new(&self) -> bool {
        self.0 == 0
    }

    /// 检查聚合是否已创建（版本大于零）
    pub fn is_created(&self) -> bool {
        self.0 > 0
    }

    /// 该版本是否落在 `interval` 的整数倍上（0 与 interval 为 0 时返回 false）
    pub fn is_multiple_of(&self, interval: usize) -> bool {
        interval > 0 && self.0 > 0 && self.0 % interval == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<usize> for Version {
    fn from(value: usize) -> Self {
        Self::from_value(value)
    }
}

impl From<Version> for usize {
    fn from(version: Version) -> Self {
        version.value()
    }
}
