//! Literal end-to-end scenarios, one per enumerated case in the crate's
//! design notes on testable properties.

use std::collections::HashSet;

use cfix::{Config, Table, INF};

fn small_start(start: u32) -> Config {
    Config {
        start,
        data: 1,
        ..Config::default()
    }
}

#[test]
fn scenario_1_inf_key_mixes_with_finite_keys() {
    let mut t: Table = Table::new(small_start(16));
    assert!(t.insert(7, &[!7]));
    assert!(t.insert(INF, &[!INF]));
    assert!(t.insert(9, &[!9]));

    assert_eq!(t.len(), 3);
    assert_eq!(t.min(), 7);
    assert_eq!(t.max(), 9);
    assert_eq!(t.lookup(INF), Some(vec![!INF]));
}

#[test]
fn scenario_2_bulk_insert_then_delete_odds() {
    let mut t: Table = Table::new(small_start(112));
    for k in 0..1000u32 {
        assert!(t.insert(k, &[k]));
    }
    for k in (1..1000u32).step_by(2) {
        assert!(t.delete(k));
    }

    assert_eq!(t.len(), 500);
    assert_eq!(t.lookup(123), None);
    assert_eq!(t.lookup(122), Some(vec![122]));
}

#[test]
fn scenario_3_large_random_population_holds_invariants() {
    let mut t: Table = Table::new(small_start(112));
    let mut seen = HashSet::new();
    // Deterministic "random" stream: a linear congruential walk over the
    // full u32 key space, skipping INF and repeats.
    let mut x: u32 = 0x9e37_79b9;
    while seen.len() < 1 << 16 {
        x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        if x == INF || seen.contains(&x) {
            continue;
        }
        seen.insert(x);
        assert!(t.insert(x, &[x]));
    }

    assert_eq!(t.len() as usize, seen.len());
    for &k in &seen {
        assert_eq!(t.lookup(k), Some(vec![k]));
    }

    let stats = t.stats();
    let total: u32 = stats.hist.iter().sum();
    assert_eq!(total, t.bins());
}

#[test]
fn scenario_4_fill_to_near_capacity_then_grow() {
    let mut t: Table = Table::new(Config {
        start: 16,
        data: 1,
        upper: 0.95,
        ..Config::default()
    });

    let capacity = (f64::from(t.bins()) * cfix::BIN_SIZE as f64 * 0.90) as u32;
    let mut inserted = Vec::new();
    for k in 0..capacity {
        assert!(t.insert(k, &[k]));
        inserted.push(k);
    }

    let bins_before = t.bins();
    // Push past the threshold; this must trigger a resize rather than fail.
    for k in capacity..capacity + 32 {
        assert!(t.insert(k, &[k]));
        inserted.push(k);
    }
    assert!(t.bins() >= bins_before);

    for k in inserted {
        assert_eq!(t.lookup(k), Some(vec![k]));
    }
}

#[test]
fn scenario_5_mixed_workload_matches_external_membership_model() {
    let mut t: Table = Table::new(small_start(112));
    let mut model: HashSet<u32> = HashSet::new();

    let mut x: u32 = 12345;
    for _ in 0..4000 {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let key = x % 5000;
        if key == INF {
            continue;
        }
        if model.contains(&key) {
            assert!(t.delete(key));
            model.remove(&key);
        } else {
            assert!(t.insert(key, &[key]));
            model.insert(key);
        }

        // Probe a handful of keys against both table and model.
        for probe in [key, key.wrapping_add(1), key.wrapping_add(7)] {
            let probe = probe % 5000;
            assert_eq!(t.lookup(probe).is_some(), model.contains(&probe));
        }
    }
    assert_eq!(t.len() as usize, model.len());
}

#[test]
fn scenario_6_iterator_invalidated_by_concurrent_mutation() {
    let mut t: Table = Table::new(small_start(16));
    for k in 0..5u32 {
        t.insert(k, &[k]);
    }

    let mut it = t.iter();
    let first = it.get();
    assert!(first.is_some());

    t.insert(999, &[0]);

    assert_eq!(it.forward(), cfix::IterStatus::Invalidated);
}
