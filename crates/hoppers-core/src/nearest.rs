//! Nearest-neighbor search over the free creatures.
//!
//! A linear scan comparing absolute distance on the line; equal distances go
//! to the creature with the smaller id. Both theft phases use the same rule.

use core::cmp::Ordering;

use hoppers_types::CreatureId;

use crate::entity::{Actor, Creature};
use crate::error::EngineError;

/// Absolute distance between two entities.
///
/// Both references are required; `None` is rejected with
/// [`EngineError::InvalidArgument`].
pub fn distance(a: Option<&dyn Actor>, b: Option<&dyn Actor>) -> Result<f64, EngineError> {
    let a = a.ok_or_else(|| EngineError::null_reference("first entity"))?;
    let b = b.ok_or_else(|| EngineError::null_reference("second entity"))?;
    Ok(gap(a.position(), b.position()))
}

/// The creature in `candidates` closest to `reference`, skipping `exclude`.
///
/// Returns `Ok(None)` when no candidate remains. An absent reference is
/// rejected with [`EngineError::InvalidArgument`].
pub fn nearest_creature<'a>(
    reference: Option<&dyn Actor>,
    candidates: &'a [Creature],
    exclude: Option<CreatureId>,
) -> Result<Option<&'a Creature>, EngineError> {
    let reference = reference.ok_or_else(|| EngineError::null_reference("reference entity"))?;
    let skip = exclude.and_then(|id| candidates.iter().position(|c| c.id() == id));
    Ok(nearest_index(reference.position(), candidates, skip).and_then(|i| candidates.get(i)))
}

/// Index of the creature closest to `position`, skipping index `skip`.
pub(crate) fn nearest_index(position: f64, candidates: &[Creature], skip: Option<usize>) -> Option<usize> {
    let mut best: Option<(usize, f64, CreatureId)> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        if Some(index) == skip {
            continue;
        }
        let d = gap(position, candidate.position());
        let closer = match best {
            None => true,
            Some((_, best_d, best_id)) => match d.total_cmp(&best_d) {
                Ordering::Less => true,
                Ordering::Equal => candidate.id() < best_id,
                Ordering::Greater => false,
            },
        };
        if closer {
            best = Some((index, d, candidate.id()));
        }
    }

    best.map(|(index, _, _)| index)
}

#[allow(clippy::arithmetic_side_effects)]
fn gap(a: f64, b: f64) -> f64 {
    (a - b).abs()
}
