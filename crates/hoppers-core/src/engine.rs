//! The simulation engine and its stepping algorithm.
//!
//! One call to [`Engine::run`] executes up to `iterations` steps. Each step
//! runs these phases in order:
//!
//! 1. **Move** -- every free creature hops by `r * gold`.
//! 2. **Individual theft** -- each free creature, in ascending id order,
//!    robs half the gold of its nearest free neighbor.
//! 3. **Cluster formation** -- a single claimed-marker pass groups creatures
//!    lying within the clustering tolerance of an anchor; groups of two or
//!    more merge into new clusters.
//! 4. **Cluster theft** -- every live cluster hops and robs its nearest
//!    free creature.
//! 5. **Elimination** -- when enabled, free creatures below the gold floor
//!    are removed.
//! 6. **Guardian** -- the guardian hops and absorbs the first cluster within
//!    its absorption radius (at most one per step).
//! 7. **Snapshot** -- the step is recorded and the gold audit runs.
//! 8. **Termination** -- the run stops early once a win condition holds;
//!    only the final snapshot carries the success flag.

use hoppers_types::{CreatureId, EndReason, Gold, IterationSnapshot};
use tracing::{debug, error, info, warn};

use crate::audit::{self, AuditResult};
use crate::config::{EngineConfig, MAX_CREATURES, MAX_ITERATIONS, MIN_CREATURES, MIN_ITERATIONS};
use crate::entity::{Actor, Cluster, Creature, Guardian};
use crate::error::EngineError;
use crate::history::{self, History, StepRecord};
use crate::nearest::nearest_index;
use crate::random::{RandomSource, ThreadRandom};
use crate::registry::IdRegistry;

/// Owns one simulation session: live entities, id counter, and history.
///
/// [`initialize`](Self::initialize) discards all prior state, so a single
/// engine can host any number of consecutive runs.
#[derive(Debug)]
pub struct Engine<R: RandomSource = ThreadRandom> {
    config: EngineConfig,
    rng: R,
    registry: IdRegistry,
    creatures: Vec<Creature>,
    clusters: Vec<Cluster>,
    guardian: Option<Guardian>,
    history: History,
    initial_gold: Gold,
    destroyed_gold: Gold,
    end_reason: Option<EndReason>,
}

impl Engine<ThreadRandom> {
    /// Create an engine drawing from the thread-local generator.
    pub const fn new(config: EngineConfig) -> Self {
        Self::with_random(config, ThreadRandom::new())
    }
}

impl<R: RandomSource> Engine<R> {
    /// Create an engine drawing movement from `rng`.
    pub const fn with_random(config: EngineConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            registry: IdRegistry::new(),
            creatures: Vec::new(),
            clusters: Vec::new(),
            guardian: None,
            history: History::new(),
            initial_gold: 0,
            destroyed_gold: 0,
            end_reason: None,
        }
    }

    /// Start a fresh session with `n` creatures and one guardian.
    ///
    /// Creatures get ids `1..=n`, the guardian gets `n + 1`; everyone starts
    /// at position 0 with the configured starting gold.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidArgument`] when `n` is outside `2..=1000`. The
    /// previous session is left untouched in that case.
    pub fn initialize(&mut self, n: u32) -> Result<(), EngineError> {
        if !(MIN_CREATURES..=MAX_CREATURES).contains(&n) {
            return Err(EngineError::creature_count(n, MIN_CREATURES, MAX_CREATURES));
        }

        let gold = self.config.starting_gold;

        self.creatures.clear();
        self.clusters.clear();
        self.history.clear();
        self.registry.reset();
        self.destroyed_gold = 0;
        self.end_reason = None;

        let registry = &mut self.registry;
        self.creatures = (0..n)
            .map(|_| Creature::new(registry.next_creature(), gold))
            .collect();
        let guardian = Guardian::new(self.registry.next_guardian(), gold);
        let guardian_id = guardian.id();
        self.guardian = Some(guardian);
        self.initial_gold = gold.saturating_mul(u64::from(n).saturating_add(1));

        info!(
            creatures = n,
            guardian_id = %guardian_id,
            starting_gold = gold,
            "Simulation initialized"
        );
        Ok(())
    }

    /// Run up to `iterations` steps and return the recorded history.
    ///
    /// Prior history is discarded first. The history is shorter than
    /// `iterations` when a win condition stops the run early.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidArgument`] when `iterations` is outside
    /// `1..=1000`; [`EngineError::InvalidState`] when no successful
    /// [`initialize`](Self::initialize) preceded this call.
    pub fn run(&mut self, iterations: u32) -> Result<&[IterationSnapshot], EngineError> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations) {
            return Err(EngineError::iteration_count(
                iterations,
                MIN_ITERATIONS,
                MAX_ITERATIONS,
            ));
        }
        if self.guardian.is_none() {
            return Err(EngineError::not_initialized());
        }

        self.history.clear();
        self.end_reason = None;

        info!(
            iterations,
            creatures = self.creatures.len(),
            clusters = self.clusters.len(),
            "Simulation starting"
        );

        let mut reason = EndReason::IterationBudgetExhausted;
        for iteration in 1..=iterations {
            if let Some(verdict) = self.step(iteration)? {
                reason = verdict;
                break;
            }
        }

        if reason.is_success() {
            self.history.mark_success();
        }
        self.end_reason = Some(reason);

        info!(
            reason = ?reason,
            steps = self.history.len(),
            creatures = self.creatures.len(),
            clusters = self.clusters.len(),
            guardian_gold = self.guardian.as_ref().map(Actor::gold),
            destroyed_gold = self.destroyed_gold,
            "Simulation ended"
        );

        Ok(self.history.snapshots())
    }

    // -----------------------------------------------------------------------
    // Step
    // -----------------------------------------------------------------------

    fn step(&mut self, iteration: u32) -> Result<Option<EndReason>, EngineError> {
        let mut record = StepRecord::default();

        self.phase_move();
        self.phase_individual_theft(&mut record);
        self.phase_cluster_formation(&mut record);
        self.phase_cluster_theft(&mut record);
        self.phase_elimination(&mut record);
        self.phase_guardian(&mut record)?;

        let guardian = self
            .guardian
            .as_ref()
            .ok_or_else(EngineError::not_initialized)?;
        let snapshot = history::capture(
            iteration,
            &self.creatures,
            &self.clusters,
            guardian,
            &record,
        );
        self.history.push(snapshot);
        self.audit(iteration);

        debug!(
            iteration,
            creatures = self.creatures.len(),
            clusters = self.clusters.len(),
            creature_thefts = record.creature_thefts.len(),
            cluster_thefts = record.cluster_thefts.len(),
            formed = record.formed.len(),
            starved = record.starved.len(),
            eliminated = ?record.eliminated_cluster,
            "Step complete"
        );

        Ok(self.verdict())
    }

    fn phase_move(&mut self) {
        for creature in &mut self.creatures {
            creature.hop(&mut self.rng);
        }
    }

    fn phase_individual_theft(&mut self, record: &mut StepRecord) {
        for thief_index in 0..self.creatures.len() {
            let Some(thief) = self.creatures.get(thief_index) else {
                continue;
            };
            let thief_id = thief.id();
            let Some(victim_index) =
                nearest_index(thief.position(), &self.creatures, Some(thief_index))
            else {
                continue;
            };

            let Some(victim) = self.creatures.get_mut(victim_index) else {
                continue;
            };
            if victim.gold() == 0 {
                continue;
            }
            let victim_id = victim.id();
            let loot = victim.lose_gold(theft_amount(victim.gold()));

            if let Some(thief) = self.creatures.get_mut(thief_index) {
                thief.gain_gold(loot);
            }
            record.creature_thefts.insert(thief_id, victim_id);
        }
    }

    fn phase_cluster_formation(&mut self, record: &mut StepRecord) {
        let groups = self.group_by_proximity();
        if groups.is_empty() {
            return;
        }

        // Mark-then-compact: lift grouped creatures out of their slots, then
        // keep whatever is left in the free list.
        let mut slots: Vec<Option<Creature>> = core::mem::take(&mut self.creatures)
            .into_iter()
            .map(Some)
            .collect();

        for group in groups {
            let (indices, creatures): (Vec<usize>, Vec<Creature>) = group
                .iter()
                .filter_map(|&i| slots.get_mut(i).and_then(Option::take).map(|c| (i, c)))
                .unzip();
            let Some((anchor, others)) = creatures.split_first() else {
                continue;
            };

            let id = self.registry.next_cluster();
            match Cluster::form(id, anchor, others) {
                Ok(cluster) => {
                    debug!(
                        cluster_id = %id,
                        members = cluster.size(),
                        gold = cluster.gold(),
                        position = cluster.position(),
                        "Cluster formed"
                    );
                    record.formed.push(id);
                    self.clusters.push(cluster);
                }
                Err(err) => {
                    warn!(cluster_id = %id, %err, "Cluster formation rejected");
                    for (index, creature) in indices.into_iter().zip(creatures) {
                        if let Some(slot) = slots.get_mut(index) {
                            *slot = Some(creature);
                        }
                    }
                }
            }
        }

        self.creatures = slots.into_iter().flatten().collect();
    }

    /// Single pass over the free list: each unclaimed creature anchors a
    /// group and claims every later unclaimed creature within tolerance of
    /// it. Only groups of two or more are returned.
    fn group_by_proximity(&self) -> Vec<Vec<usize>> {
        let tolerance = self.config.cluster_tolerance;
        let mut claimed = vec![false; self.creatures.len()];
        let mut groups = Vec::new();

        for (anchor_index, anchor) in self.creatures.iter().enumerate() {
            if claimed.get(anchor_index).copied().unwrap_or(true) {
                continue;
            }
            if let Some(flag) = claimed.get_mut(anchor_index) {
                *flag = true;
            }

            let mut group = vec![anchor_index];
            let later = self
                .creatures
                .iter()
                .enumerate()
                .skip(anchor_index.saturating_add(1));
            for (other_index, other) in later {
                let Some(flag) = claimed.get_mut(other_index) else {
                    continue;
                };
                if !*flag && within(anchor.position(), other.position(), tolerance) {
                    *flag = true;
                    group.push(other_index);
                }
            }

            if group.len() > 1 {
                groups.push(group);
            }
        }

        groups
    }

    fn phase_cluster_theft(&mut self, record: &mut StepRecord) {
        for cluster in &mut self.clusters {
            cluster.hop(&mut self.rng);

            let Some(victim_index) = nearest_index(cluster.position(), &self.creatures, None) else {
                continue;
            };
            let Some(victim) = self.creatures.get_mut(victim_index) else {
                continue;
            };
            if victim.gold() == 0 {
                continue;
            }
            let loot = victim.lose_gold(theft_amount(victim.gold()));
            cluster.gain_gold(loot);
            record.cluster_thefts.insert(cluster.id(), victim.id());
        }
    }

    fn phase_elimination(&mut self, record: &mut StepRecord) {
        if !self.config.elimination.enabled {
            return;
        }
        let floor = self.config.elimination.gold_floor;
        let mut destroyed: Gold = 0;

        self.creatures.retain(|c| {
            if c.gold() < floor {
                record.starved.push(c.id());
                destroyed = destroyed.saturating_add(c.gold());
                false
            } else {
                true
            }
        });

        if !record.starved.is_empty() {
            debug!(
                removed = record.starved.len(),
                gold_floor = floor,
                destroyed,
                "Low-gold creatures eliminated"
            );
        }
        self.destroyed_gold = self.destroyed_gold.saturating_add(destroyed);
    }

    fn phase_guardian(&mut self, record: &mut StepRecord) -> Result<(), EngineError> {
        let radius = self.config.absorption_radius;
        let guardian = self
            .guardian
            .as_mut()
            .ok_or_else(EngineError::not_initialized)?;
        guardian.hop(&mut self.rng);

        let Some(index) = self
            .clusters
            .iter()
            .position(|c| guardian.reaches(c.position(), radius))
        else {
            return Ok(());
        };

        let cluster = self.clusters.remove(index);
        let id = guardian.absorb(&cluster);
        debug!(
            cluster_id = %id,
            absorbed_gold = cluster.gold(),
            guardian_gold = guardian.gold(),
            "Guardian absorbed cluster"
        );
        record.eliminated_cluster = Some(id);
        Ok(())
    }

    fn verdict(&self) -> Option<EndReason> {
        let guardian = self.guardian.as_ref()?;
        if !self.clusters.is_empty() {
            return None;
        }
        match self.creatures.as_slice() {
            [] => Some(EndReason::GuardianAlone),
            [last] if guardian.gold() > last.gold() => Some(EndReason::GuardianOutgunsLastCreature),
            _ => None,
        }
    }

    fn audit(&self, iteration: u32) {
        if let AuditResult::Anomaly(anomaly) = audit::verify_gold(
            iteration,
            self.initial_gold,
            self.total_gold(),
            self.destroyed_gold,
        ) {
            error!(
                iteration,
                initial = anomaly.initial,
                live = anomaly.live,
                destroyed = anomaly.destroyed,
                "{anomaly}"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Free creatures, ascending by id.
    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    /// Overwrite one free creature's gold and position before a run.
    ///
    /// The audit baseline moves with it, so a seeded scenario still balances.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidArgument`] if no free creature has `id`.
    pub fn seed_creature(
        &mut self,
        id: CreatureId,
        gold: Gold,
        position: f64,
    ) -> Result<(), EngineError> {
        let creature = self
            .creatures
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| EngineError::InvalidArgument {
                message: format!("no free creature with id {id}"),
            })?;
        creature.set_gold(gold);
        creature.relocate(position);
        self.initial_gold = self.total_gold().saturating_add(self.destroyed_gold);
        Ok(())
    }

    /// Live clusters, in formation order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The guardian, once initialized.
    pub const fn guardian(&self) -> Option<&Guardian> {
        self.guardian.as_ref()
    }

    /// Returns `true` after a successful [`initialize`](Self::initialize).
    pub const fn is_initialized(&self) -> bool {
        self.guardian.is_some()
    }

    /// Snapshots recorded by the last run.
    pub fn history(&self) -> &[IterationSnapshot] {
        self.history.snapshots()
    }

    /// Returns `true` if the last run recorded a successful snapshot.
    pub fn succeeded(&self) -> bool {
        self.history.any_success()
    }

    /// Why the last run stopped, if one has completed.
    pub const fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Gold present at initialization.
    pub const fn initial_gold(&self) -> Gold {
        self.initial_gold
    }

    /// Gold removed by low-gold elimination since initialization.
    pub const fn destroyed_gold(&self) -> Gold {
        self.destroyed_gold
    }

    /// Gold currently held by creatures, clusters, and the guardian.
    pub fn total_gold(&self) -> Gold {
        let creatures = self
            .creatures
            .iter()
            .fold(0_u64, |acc, c| acc.saturating_add(c.gold()));
        let clusters = self
            .clusters
            .iter()
            .fold(0_u64, |acc, c| acc.saturating_add(c.gold()));
        let guardian = self.guardian.as_ref().map_or(0, Actor::gold);
        creatures.saturating_add(clusters).saturating_add(guardian)
    }
}

/// Half of the victim's gold, rounded down.
#[allow(clippy::arithmetic_side_effects)]
const fn theft_amount(victim_gold: Gold) -> Gold {
    victim_gold / 2
}

#[allow(clippy::arithmetic_side_effects)]
fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
