//! 通用 SQL SnapshotStore 实现
//!
//! 通过宏为每个 SQL 后端生成实现，语句构建逻辑只写一份。

use std::marker::PhantomData;

use super::{SnapshotStoreConfig, SqlDatabase};
use crate::error::{DomainError, DomainResult};
use crate::snapshot::store::{IdentifierEncoding, SnapshotCodec};

/// 基于 SQL 的快照存储
pub struct SqlSnapshotStore<DB: SqlDatabase> {
    pool: DB::Pool,
    table_name: String,
    identifier_max_len: usize,
    codec: SnapshotCodec,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlSnapshotStore<DB> {
    pub fn new(pool: DB::Pool, config: SnapshotStoreConfig) -> Self {
        let codec = SnapshotCodec::builder()
            .identifier_encoding(config.identifier_encoding)
            .build();
        Self {
            pool,
            table_name: config.table_name,
            identifier_max_len: config.identifier_max_len,
            codec,
            _marker: PhantomData,
        }
    }

    /// 替换编解码配置（自定义 payload/metadata 序列化器时使用）
    pub fn with_codec(mut self, codec: SnapshotCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// 文本标识是否放得进 aggregate_id 列
    fn fits_column(&self, aggregate_id: &str) -> bool {
        self.codec.identifier_encoding() == IdentifierEncoding::Binary
            || aggregate_id.chars().count() <= self.identifier_max_len
    }

    fn ensure_fits_column(&self, aggregate_id: &str) -> DomainResult<()> {
        if !self.fits_column(aggregate_id) {
            return Err(DomainError::InvalidIdentifier {
                reason: format!(
                    "identifier longer than {} characters does not fit table {}: {aggregate_id}",
                    self.identifier_max_len, self.table_name
                ),
            });
        }
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

macro_rules! impl_sql_snapshot_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlSnapshotStore<$db_type> {
            /// 创建快照表与 (aggregate_id, version) 唯一索引（已存在时跳过）
            pub async fn configure_schema(&self) -> crate::error::DomainResult<()> {
                use super::schema::{create_table, create_unique_index};

                let table = <$db_type>::build_table_create(create_table(
                    &self.table_name,
                    self.codec.identifier_encoding(),
                    u32::try_from(self.identifier_max_len).unwrap_or(u32::MAX),
                ));
                let index = <$db_type>::build_index_create(create_unique_index(&self.table_name));

                sqlx::query(&table).execute(&self.pool).await?;
                sqlx::query(&index).execute(&self.pool).await?;

                tracing::info!(table = %self.table_name, "snapshot schema configured");
                Ok(())
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::snapshot::store::SnapshotStore for SqlSnapshotStore<$db_type> {
            async fn load(
                &self,
                aggregate_id: &str,
                offset: usize,
            ) -> crate::error::DomainResult<crate::persist::SerializedMessage> {
                use sea_query::{Alias, Expr, Order, Query};
                use sqlx::Row;

                use super::schema::{SnapshotColumn, key_value};
                use crate::snapshot::store::{SnapshotRow, StorageKey, not_found};

                // 超出列宽的标识不可能被写入过
                if !self.fits_column(aggregate_id) {
                    return Err(not_found(aggregate_id, &self.table_name));
                }
                let key = self.codec.encode_key(aggregate_id)?;

                let stmt = Query::select()
                    .columns(SnapshotColumn::ROW)
                    .from(Alias::new(&self.table_name))
                    .and_where(Expr::col(SnapshotColumn::AggregateId).eq(key_value(&key)))
                    .order_by(SnapshotColumn::Version, Order::Desc)
                    .limit(1)
                    .offset(offset as u64)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let Some(row) = sqlx::query(&sql).fetch_optional(&self.pool).await? else {
                    return Err(not_found(aggregate_id, &self.table_name));
                };

                let stored_key = match key {
                    StorageKey::Text(_) => {
                        StorageKey::Text(row.try_get::<String, _>("aggregate_id")?)
                    }
                    StorageKey::Binary(_) => {
                        StorageKey::Binary(row.try_get::<Vec<u8>, _>("aggregate_id")?)
                    }
                };
                let snapshot_row = SnapshotRow {
                    aggregate_id: stored_key,
                    version: row.try_get::<i64, _>("version")?,
                    payload: row.try_get::<String, _>("payload")?,
                    metadata: row.try_get::<String, _>("metadata")?,
                    recorded_at: row.try_get::<String, _>("recorded_at")?,
                    message_type: row.try_get::<String, _>("type")?,
                };

                tracing::debug!(
                    aggregate_id,
                    offset,
                    version = snapshot_row.version,
                    table = %self.table_name,
                    "snapshot loaded"
                );
                self.codec.decode(&snapshot_row)
            }

            async fn append(
                &self,
                aggregate_id: &str,
                message: crate::persist::SerializedMessage,
            ) -> crate::error::DomainResult<()> {
                use sea_query::{Alias, Query};

                use super::schema::{SnapshotColumn, key_value};
                use crate::snapshot::store::ensure_same_aggregate;

                ensure_same_aggregate(aggregate_id, &message)?;
                self.ensure_fits_column(aggregate_id)?;
                let row = self.codec.encode(&message)?;
                let version = row.version;

                // InsertStatement 不是 Send，必须在第一个 await 之前渲染成文本
                let sql = {
                    let mut stmt = Query::insert();
                    stmt.into_table(Alias::new(&self.table_name))
                        .columns(SnapshotColumn::ROW);
                    stmt.values([
                        key_value(&row.aggregate_id).into(),
                        row.version.into(),
                        row.payload.into(),
                        row.metadata.into(),
                        row.recorded_at.into(),
                        row.message_type.into(),
                    ])
                    .map_err(|err| DomainError::Storage {
                        reason: err.to_string(),
                    })?;
                    <$db_type>::build_insert(stmt)
                };

                let mut tx = self.pool.begin().await?;
                if let Err(err) = sqlx::query(&sql).execute(&mut *tx).await {
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::error!(error = %rollback_err, "snapshot rollback failed");
                    }
                    if is_unique_violation(&err) {
                        tracing::warn!(aggregate_id, version, "duplicate snapshot rejected");
                        return Err(DomainError::StorageConflict {
                            aggregate_id: aggregate_id.to_string(),
                            version: message.version().value(),
                        });
                    }
                    tracing::warn!(aggregate_id, version, error = %err, "snapshot append rolled back");
                    return Err(DomainError::Storage {
                        reason: err.to_string(),
                    });
                }
                tx.commit().await?;

                tracing::debug!(aggregate_id, version, table = %self.table_name, "snapshot appended");
                Ok(())
            }
        }
    };
}

impl_sql_snapshot_store!(super::postgres::Postgres, "postgres");
impl_sql_snapshot_store!(super::sqlite::Sqlite, "sqlite");
