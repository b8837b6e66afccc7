use snapshotting_core::aggregate::{Aggregate, EventSourced};
use snapshotting_core::entity::Entity;
use snapshotting_core::error::DomainError;
use snapshotting_core::value_object::Version;
use snapshotting_macros::{aggregate, event};

#[event(id = String)]
enum AccountEvent {
    Opened { name: String },
}

#[aggregate(id = String, event = AccountEvent)]
struct Account {
    name: String,
}

impl Aggregate for Account {
    const TYPE: &'static str = "account";
    type Command = ();
    type Event = AccountEvent;
    type Error = DomainError;

    fn execute(&self, _command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        Ok(vec![])
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened { name, .. } => self.name = name.clone(),
        }
    }
}

fn main() {
    let mut account = Account::new("a-1".to_string());
    assert_eq!(account.id(), "a-1");
    assert_eq!(account.version(), Version::new());

    account
        .record(AccountEvent::Opened {
            id: ulid::Ulid::new().to_string(),
            aggregate_version: Version::from_value(1),
            name: "alice".to_string(),
        })
        .unwrap();
    assert_eq!(account.version(), Version::from_value(1));
    assert_eq!(account.pending_events().len(), 1);

    let copy = account.clone();
    let _ = format!("{copy:?}");
}
