//! 存储层序列化器
//!
//! 快照存储把 payload 与 metadata 分别交给各自的序列化器转换为文本列，
//! 二者可以独立配置。
//!
use crate::error::{DomainError, DomainResult};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// 值与传输形式（文本）之间的转换
pub trait Serializer: Debug + Send + Sync {
    fn serialize(&self, value: &Value) -> DomainResult<String>;

    fn deserialize(&self, data: &str) -> DomainResult<Value>;
}

/// 基于 serde_json 的默认序列化器
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, value: &Value) -> DomainResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize(&self, data: &str) -> DomainResult<Value> {
        serde_json::from_str(data).map_err(|err| DomainError::Parse {
            reason: format!("invalid json column: {err}"),
        })
    }
}

pub(crate) fn json_serializer() -> Arc<dyn Serializer> {
    Arc::new(JsonSerializer)
}
