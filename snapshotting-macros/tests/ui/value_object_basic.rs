use snapshotting_macros::value_object;

#[value_object]
struct Amount {
    value: i64,
}

#[value_object(debug = false)]
struct Label(String);

#[value_object]
enum Level {
    #[default]
    Low,
    High,
}

fn main() {
    let _ = format!("{:?}", Amount { value: 0 });

    let a = Amount::default();
    let b = a.clone();
    assert!(a == b);

    let _ = Label("x".to_string()).clone();
    let level: Level = Default::default();
    assert!(level == Level::Low);
    assert!(Level::High != level);
}
