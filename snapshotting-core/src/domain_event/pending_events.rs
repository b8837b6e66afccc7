use chrono::{DateTime, Utc};
use std::slice::Iter;
use std::vec::IntoIter;

use super::{DomainEvent, Metadata};
use crate::value_object::Version;

/// 已应用到聚合、但尚未提交到事件存储的单条事件
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent<E> {
    pub payload: E,
    pub metadata: Metadata,
    pub recorded_at: DateTime<Utc>,
}

impl<E: DomainEvent> PendingEvent<E> {
    pub fn new(payload: E, metadata: Metadata) -> Self {
        Self {
            payload,
            metadata,
            recorded_at: Utc::now(),
        }
    }

    /// 提交后该事件占据的版本
    pub fn version(&self) -> Version {
        self.payload.aggregate_version()
    }
}

/// 待提交事件队列，按记录顺序排列
///
/// 触发策略只接收它的副本，评估过程不会改动聚合本身。
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvents<E> {
    events: Vec<PendingEvent<E>>,
}

impl<E> Default for PendingEvents<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E: DomainEvent> PendingEvents<E> {
    pub fn new(events: Vec<PendingEvent<E>>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: PendingEvent<E>) {
        self.events.push(event);
    }

    pub fn iter(&self) -> Iter<'_, PendingEvent<E>> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 队列中最后一条事件的版本
    pub fn last_version(&self) -> Option<Version> {
        self.events.last().map(PendingEvent::version)
    }

    /// 仅取出事件载荷
    pub fn payloads(&self) -> impl Iterator<Item = &E> {
        self.events.iter().map(|e| &e.payload)
    }
}

impl<E> IntoIterator for PendingEvents<E> {
    type Item = PendingEvent<E>;
    type IntoIter = IntoIter<PendingEvent<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a PendingEvents<E> {
    type Item = &'a PendingEvent<E>;
    type IntoIter = Iter<'a, PendingEvent<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
