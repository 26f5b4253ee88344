//! Randomized invariant checks over many seeded runs.
//!
//! Each test sweeps a range of seeds and creature counts and asserts
//! properties that must hold for every recorded snapshot, whatever path the
//! random walk takes.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeSet;

use hoppers_core::config::{EliminationPolicy, EngineConfig};
use hoppers_core::random::SeededRandom;
use hoppers_core::{Engine, NoOpReporter, simulate};
use hoppers_types::{CreatureId, Gold, IterationSnapshot, SimulationRequest};

const SEEDS: u64 = 24;

fn engine(seed: u64, config: EngineConfig) -> Engine<SeededRandom> {
    Engine::with_random(config, SeededRandom::new(seed))
}

/// Creature count for a given seed, spread over the allowed range.
fn quantity_for(seed: u64) -> u32 {
    let spread = u32::try_from(seed % 40).unwrap();
    spread.saturating_mul(2).saturating_add(2)
}

fn run_all<F>(config: &EngineConfig, iterations: u32, mut check: F)
where
    F: FnMut(u32, &[IterationSnapshot], &Engine<SeededRandom>),
{
    for seed in 0..SEEDS {
        let n = quantity_for(seed);
        let mut engine = engine(seed, config.clone());
        engine.initialize(n).unwrap();
        let history = engine.run(iterations).unwrap().to_vec();
        check(n, &history, &engine);
    }
}

#[test]
fn live_gold_never_exceeds_initial_total() {
    let config = EngineConfig::default();
    run_all(&config, 200, |n, history, engine| {
        let initial = config.starting_gold.saturating_mul(Gold::from(n) + 1);
        assert_eq!(engine.initial_gold(), initial);
        for snap in history {
            assert!(snap.total_gold() <= initial, "iteration {}", snap.iteration);
        }
        assert_eq!(
            engine.total_gold() + engine.destroyed_gold(),
            engine.initial_gold()
        );
    });
}

#[test]
fn gold_is_conserved_without_elimination() {
    let config = EngineConfig {
        elimination: EliminationPolicy::disabled(),
        ..EngineConfig::default()
    };
    run_all(&config, 150, |n, history, engine| {
        let initial = config.starting_gold * (Gold::from(n) + 1);
        for snap in history {
            assert_eq!(snap.total_gold(), initial, "iteration {}", snap.iteration);
        }
        assert_eq!(engine.destroyed_gold(), 0);
    });
}

#[test]
fn every_creature_is_in_at_most_one_place() {
    run_all(&EngineConfig::default(), 200, |n, history, _| {
        for snap in history {
            let mut seen = BTreeSet::new();
            for creature in &snap.creatures {
                assert!(seen.insert(creature.id), "duplicate free {}", creature.id);
                assert!((1..=n).contains(&creature.id.get()));
            }
            for cluster in &snap.clusters {
                assert!(cluster.member_ids.len() >= 2);
                for member in &cluster.member_ids {
                    assert!(seen.insert(*member), "double membership {member}");
                }
            }
            assert!(seen.len() <= usize::try_from(n).unwrap());
        }
    });
}

#[test]
fn ids_never_collide_across_kinds() {
    run_all(&EngineConfig::default(), 200, |n, history, _| {
        let guardian_id = n + 1;
        for snap in history {
            assert_eq!(snap.guardian.id.get(), guardian_id);
            for cluster in &snap.clusters {
                assert!(cluster.cluster_id.get() > guardian_id);
            }
            let live: BTreeSet<_> = snap.clusters.iter().map(|c| c.cluster_id).collect();
            assert_eq!(live.len(), snap.clusters.len());
        }
    });
}

#[test]
fn free_creatures_are_listed_in_id_order() {
    run_all(&EngineConfig::default(), 100, |_, history, _| {
        for snap in history {
            let ids: Vec<CreatureId> = snap.creatures.iter().map(|c| c.id).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            assert_eq!(ids, sorted);
        }
    });
}

#[test]
fn victims_were_free_when_robbed() {
    run_all(&EngineConfig::default(), 200, |n, history, _| {
        let mut free_before: BTreeSet<CreatureId> = (1..=n).map(CreatureId).collect();
        for snap in history {
            for creature in &snap.creatures {
                if let Some(victim) = creature.robbed_id {
                    assert_ne!(victim, creature.id);
                    assert!(free_before.contains(&victim));
                }
            }
            for cluster in &snap.clusters {
                if let Some(victim) = cluster.robbed_id {
                    assert!(free_before.contains(&victim));
                }
            }
            free_before = snap.creatures.iter().map(|c| c.id).collect();
        }
    });
}

#[test]
fn success_flag_only_on_final_snapshot() {
    run_all(&EngineConfig::default(), 300, |_, history, engine| {
        let Some((last, earlier)) = history.split_last() else {
            panic!("history must not be empty");
        };
        assert!(earlier.iter().all(|s| !s.success));

        if last.success {
            assert!(last.clusters.is_empty());
            match last.creatures.as_slice() {
                [] => {}
                [only] => assert!(last.guardian.gold > only.gold),
                more => panic!("success with {} free creatures", more.len()),
            }
        } else {
            assert_eq!(history.len(), 300);
        }
        assert_eq!(
            last.success,
            engine.end_reason().is_some_and(|r| r.is_success())
        );
    });
}

#[test]
fn guardian_absorbs_at_most_one_cluster_per_step() {
    run_all(&EngineConfig::default(), 200, |_, history, _| {
        for pair in history.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            let Some(eliminated) = after.guardian.eliminated_cluster_id else {
                continue;
            };
            assert!(!after.clusters.iter().any(|c| c.cluster_id == eliminated));
            assert!(after.guardian.gold > before.guardian.gold);
        }
    });
}

#[test]
fn same_seed_replays_identically() {
    for seed in [1, 17, 99] {
        let mut a = engine(seed, EngineConfig::default());
        let mut b = engine(seed, EngineConfig::default());
        let request = SimulationRequest {
            quantity: 25,
            iterations: 50,
            user_login: None,
        };
        let left = simulate(&mut a, &request, &mut NoOpReporter::new()).unwrap();
        let right = simulate(&mut b, &request, &mut NoOpReporter::new()).unwrap();
        assert_eq!(left.history, right.history);
        assert_eq!(left.end_reason, right.end_reason);
    }
}

#[test]
fn out_of_range_requests_are_rejected() {
    let mut engine = engine(0, EngineConfig::default());
    for (quantity, iterations) in [(1, 10), (1001, 10), (10, 0), (10, 1001)] {
        let request = SimulationRequest {
            quantity,
            iterations,
            user_login: None,
        };
        let err = simulate(&mut engine, &request, &mut NoOpReporter::new()).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
