//! 快照表结构（sea-query 标识与建表语句）

use super::super::{IdentifierEncoding, StorageKey};
use sea_query::{Alias, ColumnDef, Iden, Index, IndexCreateStatement, Table, TableCreateStatement};

/// 快照表列
#[derive(Iden, Clone, Copy)]
pub enum SnapshotColumn {
    #[iden = "id"]
    Id,
    #[iden = "aggregate_id"]
    AggregateId,
    #[iden = "version"]
    Version,
    #[iden = "payload"]
    Payload,
    #[iden = "metadata"]
    Metadata,
    #[iden = "recorded_at"]
    RecordedAt,
    #[iden = "type"]
    MessageType,
}

impl SnapshotColumn {
    /// 读写快照行时使用的列（不含自增主键）
    pub(crate) const ROW: [SnapshotColumn; 6] = [
        SnapshotColumn::AggregateId,
        SnapshotColumn::Version,
        SnapshotColumn::Payload,
        SnapshotColumn::Metadata,
        SnapshotColumn::RecordedAt,
        SnapshotColumn::MessageType,
    ];
}

pub(crate) fn create_table(
    table: &str,
    encoding: IdentifierEncoding,
    identifier_max_len: u32,
) -> TableCreateStatement {
    let mut aggregate_id = ColumnDef::new(SnapshotColumn::AggregateId);
    match encoding {
        IdentifierEncoding::Text => aggregate_id.string_len(identifier_max_len),
        IdentifierEncoding::Binary => aggregate_id.binary_len(16),
    };
    aggregate_id.not_null();

    Table::create()
        .table(Alias::new(table))
        .if_not_exists()
        .col(
            ColumnDef::new(SnapshotColumn::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(&mut aggregate_id)
        .col(ColumnDef::new(SnapshotColumn::Version).big_integer().not_null())
        .col(ColumnDef::new(SnapshotColumn::Payload).text().not_null())
        .col(ColumnDef::new(SnapshotColumn::Metadata).text().not_null())
        .col(ColumnDef::new(SnapshotColumn::RecordedAt).string_len(32).not_null())
        .col(ColumnDef::new(SnapshotColumn::MessageType).string_len(255).not_null())
        .to_owned()
}

pub(crate) fn create_unique_index(table: &str) -> IndexCreateStatement {
    Index::create()
        .name(format!("{table}_aggregate_version_uidx"))
        .table(Alias::new(table))
        .col(SnapshotColumn::AggregateId)
        .col(SnapshotColumn::Version)
        .unique()
        .if_not_exists()
        .to_owned()
}

pub(crate) fn key_value(key: &StorageKey) -> sea_query::Value {
    match key {
        StorageKey::Text(id) => id.clone().into(),
        StorageKey::Binary(bytes) => bytes.clone().into(),
    }
}
