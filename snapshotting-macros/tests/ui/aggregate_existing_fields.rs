use snapshotting_core::aggregate::Aggregate;
use snapshotting_core::domain_event::PendingEvents;
use snapshotting_core::entity::Entity;
use snapshotting_core::error::DomainError;
use snapshotting_core::value_object::Version;
use snapshotting_macros::{aggregate, event};

#[event(id = String)]
enum ItemEvent {
    Added { sku: String },
}

// 已声明的 id/version/pending_events 沿用用户定义，debug = false 时不派生 Debug
#[aggregate(id = u64, event = ItemEvent, debug = false)]
struct Basket {
    items: Vec<String>,
    pending_events: PendingEvents<ItemEvent>,
    version: Version,
    id: u64,
}

impl Aggregate for Basket {
    const TYPE: &'static str = "basket";
    type Command = ();
    type Event = ItemEvent;
    type Error = DomainError;

    fn execute(&self, _command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        Ok(vec![])
    }

    fn apply(&mut self, event: &Self::Event) {
        let ItemEvent::Added { sku, .. } = event;
        self.items.push(sku.clone());
    }
}

fn main() {
    let basket = Basket::new(7);
    assert_eq!(*basket.id(), 7);
    assert_eq!(basket.version(), Version::new());
    assert!(basket.items.is_empty());
    assert!(basket.pending_events.is_empty());
}
