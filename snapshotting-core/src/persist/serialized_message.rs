//! 序列化消息（SerializedMessage）
//!
//! 事件日志与快照存储共用的持久化信封：事件以事件类型为 `type`，
//! 快照以聚合类型为 `type`。
//!
use crate::{
    domain_event::{DomainEvent, Metadata, PendingEvent},
    error::{DomainError, DomainResult},
    value_object::Version,
};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct SerializedMessage {
    /// 聚合 ID，在聚合生命周期内保持不变
    #[builder(into)]
    aggregate_id: String,
    /// 聚合版本（同一聚合内严格递增）
    version: Version,
    /// 元数据，核心逻辑不解释
    #[builder(default)]
    metadata: Metadata,
    /// 事件数据或聚合状态
    payload: Value,
    /// 创建时间
    #[builder(default = Utc::now())]
    recorded_at: DateTime<Utc>,
    /// 类型标识，用于多态反序列化
    #[serde(rename = "type")]
    #[builder(into)]
    message_type: String,
}

impl SerializedMessage {
    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// 将 payload 反序列化为指定类型
    pub fn decode_payload<T: DeserializeOwned>(&self) -> DomainResult<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// 从待提交事件创建事件消息
    pub fn from_pending<E: DomainEvent>(
        aggregate_id: &str,
        event: &PendingEvent<E>,
    ) -> DomainResult<Self> {
        Ok(Self {
            aggregate_id: aggregate_id.to_string(),
            version: event.version(),
            metadata: event.metadata.clone(),
            payload: serde_json::to_value(&event.payload)?,
            recorded_at: event.recorded_at,
            message_type: event.payload.event_type().to_string(),
        })
    }

    /// 将事件消息还原为事件，并校验类型与版本
    pub fn to_event<E: DomainEvent>(&self) -> DomainResult<E> {
        let event: E = self.decode_payload()?;
        if event.event_type() != self.message_type {
            return Err(DomainError::TypeMismatch {
                expected: self.message_type.clone(),
                found: event.event_type().to_string(),
            });
        }
        if event.aggregate_version() != self.version {
            return Err(DomainError::VersionConflict {
                expected: self.version.value(),
                actual: event.aggregate_version().value(),
            });
        }
        Ok(event)
    }
}
