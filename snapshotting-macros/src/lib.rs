//! 快照仓储配套过程宏
//!
//! - `#[aggregate]`：为事件溯源聚合补齐 id/version/pending_events 字段并实现 `Entity`/`EventSourced`
//! - `#[event]`：为事件枚举补齐 id/aggregate_version 字段并实现 `DomainEvent`
//! - `#[value_object]`：为值对象合并常用派生
//!
use proc_macro::TokenStream;

mod aggregate;
mod domain_event;
mod utils;
mod value_object;

/// 聚合宏
/// - 追加字段：`id: IdType`, `version: Version`, `pending_events: PendingEvents<Event>`，并置于字段最前
/// - 自动实现 `::snapshotting_core::entity::Entity` 与 `::snapshotting_core::aggregate::EventSourced`
/// - 参数：`#[aggregate(id = IdType, event = EventType, debug = true|false)]`，`event` 必填，`id` 默认 `String`
#[proc_macro_attribute]
pub fn aggregate(attr: TokenStream, item: TokenStream) -> TokenStream {
    aggregate::expand(attr, item)
}

/// 事件宏
/// - 仅支持具名字段变体，并为每个变体补齐 `id: IdType`, `aggregate_version: Version`
/// - 枚举级：`#[event(id = IdType, version = N)]`
/// - 变体级：`#[event(event_type = "...", event_version = N, skip_snapshot = true)]`
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}

/// 值对象宏：合并派生 Default, Clone, (Debug 可控), Serialize, Deserialize, PartialEq, Eq
#[proc_macro_attribute]
pub fn value_object(attr: TokenStream, item: TokenStream) -> TokenStream {
    value_object::expand(attr, item)
}
