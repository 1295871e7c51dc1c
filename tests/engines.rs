//! Integration tests that replay identical workloads against every engine.

use ordered_index::{
    BPlusIndex, BStarIndex, Config, Engine, Entry, IndexKind, Key, OrderedIndex, Result,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Multiset reference model: key -> payloads currently stored under it
#[derive(Default)]
struct Model {
    entries: BTreeMap<Key, Vec<String>>,
    len: usize,
}

impl Model {
    fn insert(&mut self, key: Key, payload: String) {
        self.entries.entry(key).or_default().push(payload);
        self.len += 1;
    }

    fn contains(&self, key: Key, payload: &str) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|payloads| payloads.iter().any(|p| p == payload))
    }

    fn remove(&mut self, key: Key, payload: &str) {
        let payloads = self.entries.get_mut(&key).expect("key in model");
        let pos = payloads
            .iter()
            .position(|p| p == payload)
            .expect("payload in model");
        payloads.swap_remove(pos);
        if payloads.is_empty() {
            self.entries.remove(&key);
        }
        self.len -= 1;
    }

    fn sorted_pairs(&self) -> Vec<(Key, String)> {
        let mut pairs: Vec<(Key, String)> = self
            .entries
            .iter()
            .flat_map(|(k, ps)| ps.iter().map(move |p| (*k, p.clone())))
            .collect();
        pairs.sort();
        pairs
    }
}

fn open_all(degree: usize) -> Result<Vec<Engine>> {
    IndexKind::ALL
        .iter()
        .map(|kind| Engine::open(&Config::new(*kind).min_degree(degree)))
        .collect()
}

fn check_against_model(engine: &Engine, model: &Model) -> Result<()> {
    engine.validate()?;
    assert_eq!(engine.len(), model.len, "{}", engine.kind());

    let keys: Vec<Key> = engine.entries().map(Entry::key).collect();
    assert!(
        keys.windows(2).all(|w| w[0] <= w[1]),
        "{} iterates out of order",
        engine.kind()
    );

    let mut pairs: Vec<(Key, String)> = engine
        .entries()
        .map(|e| (e.key(), e.payload().to_string()))
        .collect();
    pairs.sort();
    assert_eq!(pairs, model.sorted_pairs(), "{}", engine.kind());
    Ok(())
}

fn run_random_workload(degree: usize, seed: u64, ops: usize, key_space: Key) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut engines = open_all(degree)?;
    let mut models: Vec<Model> = engines.iter().map(|_| Model::default()).collect();

    for step in 0..ops {
        let key = rng.gen_range(-key_space..key_space);
        let roll = rng.gen_range(0..10);

        for (engine, model) in engines.iter_mut().zip(models.iter_mut()) {
            match roll {
                0..=4 => {
                    let payload = format!("{key}-{step}");
                    engine.insert(key, payload.clone());
                    model.insert(key, payload);
                }
                5..=6 => {
                    let found = engine.search(key).cloned();
                    match &found {
                        Some(entry) => {
                            assert_eq!(entry.key(), key);
                            assert!(model.contains(key, entry.payload()));
                        }
                        None => assert!(!model.entries.contains_key(&key), "{}", engine.kind()),
                    }
                    // Searching has no side effects
                    assert_eq!(engine.search(key).cloned(), found);
                }
                _ => match engine.delete(key) {
                    Some(entry) => {
                        assert_eq!(entry.key(), key);
                        assert!(model.contains(key, entry.payload()));
                        model.remove(key, entry.payload());
                    }
                    None => assert!(!model.entries.contains_key(&key), "{}", engine.kind()),
                },
            }
            check_against_model(engine, model)?;
        }
    }
    Ok(())
}

#[test]
fn test_random_workloads_match_model() -> Result<()> {
    for degree in [2, 3, 4, 5] {
        run_random_workload(degree, 0xB7EE + degree as u64, 1500, 64)?;
    }
    Ok(())
}

#[test]
fn test_sparse_keys_mostly_unique() -> Result<()> {
    run_random_workload(3, 42, 2000, 10_000)
}

#[test]
fn test_insert_then_delete_everything() -> Result<()> {
    for degree in [2, 3, 4, 5] {
        for mut engine in open_all(degree)? {
            let keys: Vec<Key> = (0..300).map(|i| (i * 7919) % 1009).collect();
            for &k in &keys {
                engine.insert(k, format!("p{k}"));
            }
            engine.validate()?;
            assert_eq!(engine.len(), keys.len());

            for &k in &keys {
                assert_eq!(
                    engine.search(k).map(Entry::payload),
                    Some(format!("p{k}").as_str())
                );
            }

            for &k in keys.iter().rev() {
                assert_eq!(engine.delete(k), Some(Entry::new(k, format!("p{k}"))));
                assert_eq!(engine.search(k), None);
                engine.validate()?;
            }
            assert!(engine.is_empty());
            assert_eq!(engine.entries().count(), 0);
            assert_eq!(engine.delete(0), None);
        }
    }
    Ok(())
}

#[test]
fn test_duplicate_keys_each_removable() -> Result<()> {
    for mut engine in open_all(2)? {
        for i in 0..20 {
            engine.insert(7, format!("dup{i}"));
            engine.insert(i, format!("other{i}"));
        }
        engine.validate()?;
        assert_eq!(engine.len(), 40);

        // Key 7 holds twenty copies plus "other7"
        let mut removed = Vec::new();
        while let Some(entry) = engine.delete(7) {
            assert_eq!(entry.key(), 7);
            removed.push(entry.into_payload());
            engine.validate()?;
        }
        assert_eq!(removed.len(), 21, "{}", engine.kind());
        assert!(removed.contains(&"other7".to_string()));
        assert_eq!(engine.len(), 19);
    }
    Ok(())
}

#[test]
fn test_balanced_height_stays_logarithmic() -> Result<()> {
    let mut engine = Engine::open(&Config::new(IndexKind::Avl))?;
    for k in 0..4096 {
        engine.insert(k, "v".to_string());
    }
    // A height-balanced tree of n nodes is at most ~1.44 log2(n) tall
    let height = engine.stats().height;
    assert!((13..=17).contains(&height), "height {height}");
    engine.validate()
}

#[test]
fn test_multiway_height_bound() -> Result<()> {
    for kind in [IndexKind::BTree, IndexKind::BPlus, IndexKind::BStar] {
        let mut engine = Engine::open(&Config::new(kind).min_degree(3))?;
        for k in 0..2000 {
            engine.insert(k, "v".to_string());
        }
        // Every non-root node has at least d children
        let bound = ((2000f64 + 1.0) / 2.0).log(3.0).floor() as usize + 1;
        assert!(engine.stats().height <= bound, "{kind}");
    }
    Ok(())
}

fn check_leaf_chain(chain: Vec<Key>, all: &[Key]) {
    assert!(chain.windows(2).all(|w| w[0] <= w[1]));
    assert!(chain.len() <= all.len());
    assert!(chain.iter().all(|k| all.contains(k)));
}

#[test]
fn test_leaf_chain_integrity_under_churn() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    for degree in [2, 3, 4] {
        let mut bplus = BPlusIndex::new(degree)?;
        let mut bstar = BStarIndex::new(degree)?;

        for _ in 0..1500 {
            let key = rng.gen_range(0..200);
            if rng.gen_bool(0.6) {
                bplus.insert(key, "v");
                bstar.insert(key, "v");
            } else {
                bplus.delete(key);
                bstar.delete(key);
            }
            bplus.validate()?;
            bstar.validate()?;
        }

        let all: Vec<Key> = bplus.iter().map(Entry::key).collect();
        check_leaf_chain(bplus.leaf_entries().map(Entry::key).collect(), &all);
        let all: Vec<Key> = bstar.iter().map(Entry::key).collect();
        check_leaf_chain(bstar.leaf_entries().map(Entry::key).collect(), &all);
    }
    Ok(())
}
