//! The three entity kinds and the behavior they share.
//!
//! Creatures, clusters, and the guardian all occupy a position on the line,
//! hold gold, hop by a gold-weighted random walk, and can gain or lose gold.
//! That capability set is the [`Actor`] trait; each kind adds only what is
//! specific to it (cluster membership, guardian absorption).

use hoppers_types::{ClusterId, CreatureId, Gold, GuardianId};

use crate::error::EngineError;
use crate::random::RandomSource;

/// Positions closer than this are treated as identical.
pub const POSITION_EPSILON: f64 = 1e-10;

/// Shared behavior of every entity on the line.
pub trait Actor {
    /// Current position.
    fn position(&self) -> f64;

    /// Current gold.
    fn gold(&self) -> Gold;

    /// Move to an absolute position.
    fn relocate(&mut self, position: f64);

    /// Add `amount` gold.
    fn gain_gold(&mut self, amount: Gold);

    /// Remove up to `amount` gold, returning how much was actually removed.
    fn lose_gold(&mut self, amount: Gold) -> Gold;

    /// Hop by `r * gold` with a fresh draw `r`. Returns the new position.
    ///
    /// An actor with no gold does not move.
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    fn hop(&mut self, rng: &mut dyn RandomSource) -> f64 {
        let r = rng.next_unit();
        let next = self.position() + r * self.gold() as f64;
        self.relocate(next);
        next
    }
}

// ---------------------------------------------------------------------------
// Creature
// ---------------------------------------------------------------------------

/// A free, unclustered agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    id: CreatureId,
    gold: Gold,
    position: f64,
}

impl Creature {
    /// Create a creature at the origin.
    pub const fn new(id: CreatureId, gold: Gold) -> Self {
        Self::at(id, gold, 0.0)
    }

    /// Create a creature at an arbitrary position.
    pub const fn at(id: CreatureId, gold: Gold, position: f64) -> Self {
        Self { id, gold, position }
    }

    /// This creature's id.
    pub const fn id(&self) -> CreatureId {
        self.id
    }

    /// Overwrite the gold balance.
    pub const fn set_gold(&mut self, gold: Gold) {
        self.gold = gold;
    }
}

impl Actor for Creature {
    fn position(&self) -> f64 {
        self.position
    }

    fn gold(&self) -> Gold {
        self.gold
    }

    fn relocate(&mut self, position: f64) {
        self.position = position;
    }

    fn gain_gold(&mut self, amount: Gold) {
        self.gold = self.gold.saturating_add(amount);
    }

    fn lose_gold(&mut self, amount: Gold) -> Gold {
        let taken = amount.min(self.gold);
        self.gold = self.gold.saturating_sub(taken);
        taken
    }
}

// ---------------------------------------------------------------------------
// Cluster
// ---------------------------------------------------------------------------

/// A merged group of at least two creatures sharing one position and one purse.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    members: Vec<CreatureId>,
    gold: Gold,
    position: f64,
}

impl Cluster {
    /// Merge `anchor` and `others` into a new cluster at the anchor's position.
    ///
    /// Fails if fewer than two creatures are supplied or a creature appears
    /// twice.
    pub fn form(id: ClusterId, anchor: &Creature, others: &[Creature]) -> Result<Self, EngineError> {
        if others.is_empty() {
            return Err(EngineError::InvalidArgument {
                message: format!("cluster {id} needs at least two members"),
            });
        }

        let mut cluster = Self {
            id,
            members: vec![anchor.id()],
            gold: anchor.gold(),
            position: anchor.position(),
        };
        for creature in others {
            cluster.add_member(creature)?;
        }
        Ok(cluster)
    }

    /// Fold one more creature's id and gold into this cluster.
    pub fn add_member(&mut self, creature: &Creature) -> Result<(), EngineError> {
        if self.contains(creature.id()) {
            return Err(EngineError::InvalidArgument {
                message: format!("creature {} is already in cluster {}", creature.id(), self.id),
            });
        }
        self.members.push(creature.id());
        self.gold = self.gold.saturating_add(creature.gold());
        Ok(())
    }

    /// This cluster's id.
    pub const fn id(&self) -> ClusterId {
        self.id
    }

    /// Member ids in merge order.
    pub fn members(&self) -> &[CreatureId] {
        &self.members
    }

    /// Number of merged creatures.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if `id` was merged into this cluster.
    pub fn contains(&self, id: CreatureId) -> bool {
        self.members.contains(&id)
    }
}

impl Actor for Cluster {
    fn position(&self) -> f64 {
        self.position
    }

    fn gold(&self) -> Gold {
        self.gold
    }

    fn relocate(&mut self, position: f64) {
        self.position = position;
    }

    fn gain_gold(&mut self, amount: Gold) {
        self.gold = self.gold.saturating_add(amount);
    }

    fn lose_gold(&mut self, amount: Gold) -> Gold {
        let taken = amount.min(self.gold);
        self.gold = self.gold.saturating_sub(taken);
        taken
    }
}

// ---------------------------------------------------------------------------
// Guardian
// ---------------------------------------------------------------------------

/// The singleton eliminator. Never removed; grows by absorbing clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Guardian {
    id: GuardianId,
    gold: Gold,
    position: f64,
}

impl Guardian {
    /// Create the guardian at the origin.
    pub const fn new(id: GuardianId, gold: Gold) -> Self {
        Self {
            id,
            gold,
            position: 0.0,
        }
    }

    /// The guardian's id.
    pub const fn id(&self) -> GuardianId {
        self.id
    }

    /// Returns `true` if `position` is within `radius` of the guardian.
    ///
    /// A zero radius still tolerates floating-point noise
    /// ([`POSITION_EPSILON`]).
    #[allow(clippy::arithmetic_side_effects)]
    pub fn reaches(&self, position: f64, radius: f64) -> bool {
        (self.position - position).abs() <= radius.max(POSITION_EPSILON)
    }

    /// Take the cluster's gold and return its id.
    pub fn absorb(&mut self, cluster: &Cluster) -> ClusterId {
        self.gold = self.gold.saturating_add(cluster.gold());
        cluster.id()
    }
}

impl Actor for Guardian {
    fn position(&self) -> f64 {
        self.position
    }

    fn gold(&self) -> Gold {
        self.gold
    }

    fn relocate(&mut self, position: f64) {
        self.position = position;
    }

    fn gain_gold(&mut self, amount: Gold) {
        self.gold = self.gold.saturating_add(amount);
    }

    fn lose_gold(&mut self, amount: Gold) -> Gold {
        let taken = amount.min(self.gold);
        self.gold = self.gold.saturating_sub(taken);
        taken
    }
}
