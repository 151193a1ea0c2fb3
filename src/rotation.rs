//! Rotation keyed off the previous day's published groups.
//!
//! Every participant of the prior assignment who is still in the pool is
//! replaced by the next participant in the prior's own ordering (wrapping
//! around), so yesterday's `[[1, 2], [3, 4]]` becomes `[[2, 3], [4, 1]]`.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::model::entity::Id;
use crate::model::group::Group;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotationMap(HashMap<Id, Id>);

impl RotationMap {
    /// Maps `participants[i]` to `participants[(i + 1) % n]`.
    pub fn build(participants: &[Id]) -> RotationMap {
        let n = participants.len();
        RotationMap(
            participants
                .iter()
                .enumerate()
                .map(|(i, id)| (*id, participants[(i + 1) % n]))
                .collect(),
        )
    }

    pub fn get(&self, id: Id) -> Option<Id> {
        self.0.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Prior participants that are still in `pool`, first occurrence wins.
pub fn participants(prior: &[Group], pool: &HashSet<Id>) -> Vec<Id> {
    prior
        .iter()
        .flat_map(|group| group.iter())
        .filter(|id| pool.contains(id))
        .unique()
        .collect()
}

/// Rotates each prior group; groups left with fewer than two members vanish.
/// A student listed in several prior groups only counts in the first.
pub fn rotate(prior: &[Group], pool: &HashSet<Id>) -> Vec<Group> {
    let map = RotationMap::build(&participants(prior, pool));
    let mut seen = HashSet::new();
    let mut rotated = Vec::with_capacity(prior.len());
    for group in prior {
        let members = group
            .iter()
            .filter(|id| seen.insert(*id))
            .filter_map(|id| map.get(id))
            .collect_vec();
        if members.len() >= 2 {
            rotated.push(Group::new(members));
        }
    }
    rotated
}
