//! 单元测试共用的计数器聚合

use crate::aggregate::{Aggregate, Assemble, Represent};
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use snapshotting_macros::{aggregate, event};

#[event(id = String)]
pub enum CounterEvent {
    Incremented {
        by: i64,
    },
    Decremented {
        by: i64,
    },
    #[event(skip_snapshot = true)]
    Audited {
        note: String,
    },
}

#[aggregate(id = String, event = CounterEvent)]
pub struct Counter {
    pub value: i64,
    pub audits: usize,
}

#[derive(Debug)]
pub enum CounterCommand {
    Increment { by: i64 },
    Decrement { by: i64 },
    Audit { note: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub value: i64,
    pub audits: usize,
}

impl Aggregate for Counter {
    const TYPE: &'static str = "counter";
    type Command = CounterCommand;
    type Event = CounterEvent;
    type Error = DomainError;

    fn execute(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let id = ulid::Ulid::new().to_string();
        let aggregate_version = self.version().next();
        match command {
            CounterCommand::Increment { by } => Ok(vec![CounterEvent::Incremented {
                id,
                aggregate_version,
                by,
            }]),
            CounterCommand::Decrement { by } => {
                if by > self.value {
                    return Err(DomainError::InvalidCommand {
                        reason: "counter cannot go below zero".into(),
                    });
                }
                Ok(vec![CounterEvent::Decremented {
                    id,
                    aggregate_version,
                    by,
                }])
            }
            CounterCommand::Audit { note } => Ok(vec![CounterEvent::Audited {
                id,
                aggregate_version,
                note,
            }]),
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CounterEvent::Incremented { by, .. } => self.value += by,
            CounterEvent::Decremented { by, .. } => self.value -= by,
            CounterEvent::Audited { .. } => self.audits += 1,
        }
    }
}

impl Assemble for Counter {
    type State = CounterState;

    fn assemble(&mut self, state: Self::State) -> DomainResult<()> {
        if state.value < 0 {
            return Err(DomainError::InvalidState {
                reason: "negative counter".into(),
            });
        }
        self.value = state.value;
        self.audits = state.audits;
        Ok(())
    }
}

impl Represent for Counter {
    fn represent(&self) -> Self::State {
        CounterState {
            value: self.value,
            audits: self.audits,
        }
    }
}

/// 以 `amounts` 逐条递增，返回带待提交事件的计数器
pub fn counter_with(id: &str, amounts: impl IntoIterator<Item = i64>) -> Counter {
    use crate::aggregate::EventSourced;

    let mut counter = Counter::new(id.to_string());
    for by in amounts {
        let events = counter.execute(CounterCommand::Increment { by }).unwrap();
        for event in events {
            counter.record(event).unwrap();
        }
    }
    counter
}
