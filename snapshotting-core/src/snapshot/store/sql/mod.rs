//! SQL 快照存储
//!
//! 每种聚合类型一张表，列为：自增主键、aggregate_id、version、payload、
//! metadata、recorded_at、type，并在 (aggregate_id, version) 上建立唯一索引。
//! 语句由 sea-query 构建，按后端（PostgreSQL、SQLite）分别生成实现。

mod schema;
mod snapshot_store;

pub use schema::SnapshotColumn;
pub use snapshot_store::SqlSnapshotStore;

use super::IdentifierEncoding;
use serde::{Deserialize, Serialize};

/// 按后端生成 SQL 文本
pub trait SqlDatabase: Send + Sync + 'static {
    type Pool: Clone + Send + Sync;

    fn build_select(stmt: sea_query::SelectStatement) -> String;

    fn build_insert(stmt: sea_query::InsertStatement) -> String;

    fn build_table_create(stmt: sea_query::TableCreateStatement) -> String;

    fn build_index_create(stmt: sea_query::IndexCreateStatement) -> String;
}

/// SQL 快照存储配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotStoreConfig {
    /// 快照表名（建议每种聚合类型一张表）
    pub table_name: String,
    /// 聚合 ID 列的编码方式
    pub identifier_encoding: IdentifierEncoding,
    /// 文本编码时 aggregate_id 列的宽度（字符数）
    pub identifier_max_len: usize,
}

impl SnapshotStoreConfig {
    pub const DEFAULT_IDENTIFIER_MAX_LEN: usize = 36;
}

impl Default for SnapshotStoreConfig {
    fn default() -> Self {
        Self {
            table_name: "snapshots".to_string(),
            identifier_encoding: IdentifierEncoding::Text,
            identifier_max_len: Self::DEFAULT_IDENTIFIER_MAX_LEN,
        }
    }
}

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::PostgresQueryBuilder;
    use sqlx::PgPool;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_table_create(stmt: sea_query::TableCreateStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_index_create(stmt: sea_query::IndexCreateStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }
    }

    /// PostgreSQL snapshot store.
    pub type PostgresSnapshotStore = super::SqlSnapshotStore<Postgres>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use sea_query::SqliteQueryBuilder;
    use sqlx::SqlitePool;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_table_create(stmt: sea_query::TableCreateStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_index_create(stmt: sea_query::IndexCreateStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }
    }

    /// SQLite snapshot store.
    pub type SqliteSnapshotStore = super::SqlSnapshotStore<Sqlite>;
}
