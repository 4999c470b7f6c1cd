use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::{EytzingerTable, Key, SortedTable, VebTable};

/// Reference semantics: first occurrence of a key in input order wins.
fn model(entries: &[(Key, u64)]) -> BTreeMap<Key, u64> {
    let mut map = BTreeMap::new();
    for &(k, v) in entries {
        map.entry(k).or_insert(v);
    }
    map
}

/// Build all three layouts from one input and check them pointwise against
/// the model for every probe.
fn check(entries: Vec<(Key, u64)>, probes: Vec<Key>) {
    let model = model(&entries);

    let sorted = SortedTable::build(entries.clone());
    let eytzinger = EytzingerTable::build(entries.clone());
    let veb = VebTable::build(entries.clone()).expect("capacity is nowhere near u32 range");

    assert_eq!(sorted.len(), model.len());
    assert_eq!(eytzinger.len(), model.len());
    assert_eq!(veb.len(), model.len());

    let stored_keys: Vec<Key> = entries.iter().map(|&(k, _)| k).collect();
    for probe in stored_keys.iter().chain(probes.iter()) {
        let want = model.get(probe);
        assert_eq!(sorted.get(*probe), want, "sorted, key={probe}");
        assert_eq!(eytzinger.get(*probe), want, "eytzinger, key={probe}");
        assert_eq!(veb.get(*probe), want, "veb, key={probe}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    /// Narrow key domain: collisions and adjacent keys are common, which
    /// exercises the duplicate rule and near-miss probes.
    #[test]
    fn layouts_match_model_dense(
        entries in prop::collection::vec((-64i64..64, any::<u64>()), 0..256),
        probes in prop::collection::vec(-80i64..80, 0..64),
    ) {
        check(entries, probes);
    }

    /// Full key domain including the extremes.
    #[test]
    fn layouts_match_model_sparse(
        entries in prop::collection::vec((any::<Key>(), any::<u64>()), 0..256),
        probes in prop::collection::vec(any::<Key>(), 0..64),
    ) {
        check(entries, probes);
    }

    /// Two builds from the same input answer every probe identically.
    #[test]
    fn rebuild_is_deterministic(
        entries in prop::collection::vec((-64i64..64, any::<u64>()), 0..128),
        probes in prop::collection::vec(any::<Key>(), 0..64),
    ) {
        let a = EytzingerTable::build(entries.clone());
        let b = EytzingerTable::build(entries.clone());
        let va = VebTable::build(entries.clone()).unwrap();
        let vb = VebTable::build(entries).unwrap();
        for probe in probes {
            prop_assert_eq!(a.get(probe), b.get(probe));
            prop_assert_eq!(va.get(probe), vb.get(probe));
        }
    }
}
