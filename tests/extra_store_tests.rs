use chart_flow::ChartError;
use chart_flow::core::{ExtraKey, ExtraStore, MutableExtraStore};

#[test]
fn distinct_keys_of_the_same_type_never_collide() {
    let first: ExtraKey<u32> = ExtraKey::new();
    let second: ExtraKey<u32> = ExtraKey::new();
    assert_ne!(first, second);

    let mut store = MutableExtraStore::new();
    store.set(&first, 1);
    store.set(&second, 2);

    assert_eq!(store.get(&first), Some(&1));
    assert_eq!(store.get(&second), Some(&2));
    assert_eq!(store.len(), 2);
}

#[test]
fn stores_compare_by_value() {
    let label: ExtraKey<String> = ExtraKey::new();
    let mut left = MutableExtraStore::new();
    let mut right = MutableExtraStore::new();
    left.set(&label, "volume".to_owned());
    right.set(&label, "volume".to_owned());

    assert_eq!(left, right);
    assert_eq!(left.snapshot(), right.snapshot());

    right.set(&label, "price".to_owned());
    assert_ne!(left.snapshot(), right.snapshot());
}

#[test]
fn snapshot_is_isolated_from_later_writes() {
    let count: ExtraKey<i64> = ExtraKey::new();
    let mut store = MutableExtraStore::new();
    store.set(&count, 3);
    let snapshot = store.snapshot();

    store.set(&count, 4);
    assert!(store.remove(&count));
    assert!(!store.remove(&count));

    assert_eq!(snapshot.get(&count), Some(&3));
    assert!(store.is_empty());
}

#[test]
fn merged_prefers_the_other_store() {
    let shared: ExtraKey<u8> = ExtraKey::new();
    let base_only: ExtraKey<bool> = ExtraKey::new();

    let mut base = MutableExtraStore::new();
    base.set(&shared, 1);
    base.set(&base_only, true);
    let mut overlay = MutableExtraStore::new();
    overlay.set(&shared, 9);

    let merged = base.snapshot().merged(&overlay.snapshot());
    assert_eq!(merged.get(&shared), Some(&9));
    assert_eq!(merged.get(&base_only), Some(&true));
    assert_eq!(merged.len(), 2);
}

#[test]
fn require_reports_missing_key() {
    let key: ExtraKey<f64> = ExtraKey::new();
    let err = ExtraStore::empty().require(&key).expect_err("missing");
    assert!(matches!(err, ChartError::MissingExtra { key: id } if id == key.id()));
}

#[test]
fn to_mutable_round_trips_entries() {
    let key: ExtraKey<Vec<u16>> = ExtraKey::new();
    let mut store = MutableExtraStore::new();
    store.set(&key, vec![1, 2, 3]);

    let copy = store.snapshot().to_mutable();
    assert_eq!(copy, store);
    assert!(copy.contains(&key));
}
