use crate::{
    domain_event::Metadata,
    error::{DomainError, DomainResult},
    persist::SerializedMessage,
    serializer::{Serializer, json_serializer},
    value_object::Version,
};
use bon::Builder;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// 聚合 ID 在存储层的编码方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierEncoding {
    /// 原样存储的文本，列宽由具体存储决定
    #[default]
    Text,
    /// 16 字节二进制，要求 ID 为合法 UUID
    Binary,
}

/// 编码后的存储键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Text(String),
    Binary(Vec<u8>),
}

/// 快照在存储层的一行
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub aggregate_id: StorageKey,
    pub version: i64,
    pub payload: String,
    pub metadata: String,
    pub recorded_at: String,
    pub message_type: String,
}

/// `SerializedMessage` 与存储行之间的编解码配置
#[derive(Debug, Clone, Builder)]
pub struct SnapshotCodec {
    #[builder(default)]
    identifier_encoding: IdentifierEncoding,
    #[builder(default = json_serializer())]
    payload_serializer: Arc<dyn Serializer>,
    #[builder(default = json_serializer())]
    metadata_serializer: Arc<dyn Serializer>,
}

impl Default for SnapshotCodec {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SnapshotCodec {
    pub fn identifier_encoding(&self) -> IdentifierEncoding {
        self.identifier_encoding
    }

    pub fn encode_key(&self, aggregate_id: &str) -> DomainResult<StorageKey> {
        match self.identifier_encoding {
            IdentifierEncoding::Text => Ok(StorageKey::Text(aggregate_id.to_string())),
            IdentifierEncoding::Binary => {
                let uuid =
                    Uuid::parse_str(aggregate_id).map_err(|_| DomainError::InvalidIdentifier {
                        reason: "only valid UUIDs can be used with the binary storage mode"
                            .to_string(),
                    })?;
                Ok(StorageKey::Binary(uuid.as_bytes().to_vec()))
            }
        }
    }

    pub fn decode_key(&self, key: &StorageKey) -> DomainResult<String> {
        match key {
            StorageKey::Text(id) => Ok(id.clone()),
            StorageKey::Binary(bytes) => Uuid::from_slice(bytes)
                .map(|uuid| uuid.to_string())
                .map_err(|_| DomainError::InvalidIdentifier {
                    reason: "could not convert binary storage value to UUID".to_string(),
                }),
        }
    }

    pub fn encode(&self, message: &SerializedMessage) -> DomainResult<SnapshotRow> {
        let version = i64::try_from(message.version().value()).map_err(|_| {
            DomainError::InvalidValue {
                reason: format!("version {} does not fit the storage column", message.version()),
            }
        })?;

        Ok(SnapshotRow {
            aggregate_id: self.encode_key(message.aggregate_id())?,
            version,
            payload: self.payload_serializer.serialize(message.payload())?,
            metadata: self
                .metadata_serializer
                .serialize(&serde_json::to_value(message.metadata())?)?,
            recorded_at: message
                .recorded_at()
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            message_type: message.message_type().to_string(),
        })
    }

    pub fn decode(&self, row: &SnapshotRow) -> DomainResult<SerializedMessage> {
        let version = usize::try_from(row.version).map_err(|_| DomainError::InvalidValue {
            reason: format!("negative snapshot version {}", row.version),
        })?;
        let metadata: Metadata =
            serde_json::from_value(self.metadata_serializer.deserialize(&row.metadata)?)?;
        let recorded_at = DateTime::parse_from_rfc3339(&row.recorded_at)?.with_timezone(&Utc);

        Ok(SerializedMessage::builder()
            .aggregate_id(self.decode_key(&row.aggregate_id)?)
            .version(Version::from_value(version))
            .metadata(metadata)
            .payload(self.payload_serializer.deserialize(&row.payload)?)
            .recorded_at(recorded_at)
            .message_type(row.message_type.clone())
            .build())
    }
}
