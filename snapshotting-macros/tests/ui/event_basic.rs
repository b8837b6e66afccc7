use snapshotting_core::domain_event::DomainEvent;
use snapshotting_core::value_object::Version;
use snapshotting_macros::event;

#[event(version = 1)]
enum BankEvent {
    #[event(event_type = "bank.opened")]
    Opened { name: String },
    #[event(event_type = "bank.renamed", event_version = 2)]
    Renamed { to: String },
    #[event(skip_snapshot)]
    Viewed {},
    #[event(skip_snapshot = false)]
    Closed {},
}

fn main() {
    let opened = BankEvent::Opened {
        id: "e-1".to_string(),
        aggregate_version: Version::from_value(1),
        name: "main".to_string(),
    };
    assert_eq!(opened.event_id(), "e-1");
    assert_eq!(opened.event_type(), "bank.opened");
    assert_eq!(opened.event_version(), 1);
    assert_eq!(opened.aggregate_version(), Version::from_value(1));
    assert!(!opened.skips_snapshot());

    let renamed = BankEvent::Renamed {
        id: "e-2".to_string(),
        aggregate_version: Version::from_value(2),
        to: "savings".to_string(),
    };
    assert_eq!(renamed.event_version(), 2);

    let viewed = BankEvent::Viewed {
        id: "e-3".to_string(),
        aggregate_version: Version::from_value(3),
    };
    assert!(viewed.skips_snapshot());
    assert_eq!(viewed.event_type(), "BankEvent.Viewed");

    let closed = BankEvent::Closed {
        id: "e-4".to_string(),
        aggregate_version: Version::from_value(4),
    };
    assert!(!closed.skips_snapshot());

    let json = serde_json::to_value(&viewed).unwrap();
    let back: BankEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, viewed);
}
