use std::collections::HashSet;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::model::condition::{AlgorithmKind, GroupingMode};
use crate::model::entity::{Id, Student};
use crate::model::group::{Group, LockedGroup};
use crate::rotation;
use crate::shuffle::Shuffler;
use crate::validate::check_locked_group;

/// Locked groups that survived the lenient checks, and everyone else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reservation {
    pub groups: Vec<Group>,
    pub remaining: Vec<Id>,
}

/// Accepts well-formed locked groups verbatim and drops the rest.
pub fn reserve_locked(
    locked_groups: &[LockedGroup],
    students: &[Student],
    mode: GroupingMode,
) -> Reservation {
    let roster: HashSet<Id> = students.iter().map(|s| s.id).collect();
    let mut pinned = HashSet::new();
    let mut groups = Vec::with_capacity(locked_groups.len());

    for locked in locked_groups {
        match check_locked_group(locked, &roster, &pinned, mode) {
            Ok(()) => {
                pinned.extend(locked.iter().copied());
                groups.push(Group::new(locked.clone()));
            }
            Err(e) => warn!(error = %e, "dropping locked group"),
        }
    }

    let remaining = students
        .iter()
        .map(|s| s.id)
        .filter(|id| !pinned.contains(id))
        .collect();
    Reservation { groups, remaining }
}

/// Cuts `sequence` into groups of `size`. A trailing singleton joins the last
/// group cut here; with no such group it stays unassigned.
pub fn chunk_sequence(sequence: &[Id], size: usize) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::with_capacity(sequence.len() / size.max(1) + 1);
    for chunk in sequence.chunks(size.max(1)) {
        if let [single] = chunk {
            if let Some(last) = groups.last_mut() {
                last.push(*single);
            }
            continue;
        }
        groups.push(Group::new(chunk.to_vec()));
    }
    groups
}

fn shuffled_chunks<S: Shuffler>(mut pool: Vec<Id>, size: usize, shuffler: &mut S) -> Vec<Group> {
    shuffler.shuffle(&mut pool);
    chunk_sequence(&pool, size)
}

/// Locked groups first, then whatever the strategy makes of the rest.
/// Malformed locked groups are skipped rather than reported.
pub fn form_groups<S: Shuffler>(
    students: &[Student],
    mode: GroupingMode,
    algorithm: AlgorithmKind,
    locked_groups: &[LockedGroup],
    prior: Option<&[Group]>,
    shuffler: &mut S,
) -> Vec<Group> {
    let Reservation {
        mut groups,
        remaining,
    } = reserve_locked(locked_groups, students, mode);
    let size = mode.group_size();
    debug!(
        locked = groups.len(),
        remaining = remaining.len(),
        ?algorithm,
        "reserved locked groups"
    );

    let formed = match (algorithm, prior) {
        (AlgorithmKind::Rotation, Some(prior)) if !prior.is_empty() => {
            let pool: HashSet<Id> = remaining.iter().copied().collect();
            let mut rotated = rotation::rotate(prior, &pool);
            // Newcomers and anyone whose prior group fell apart.
            let placed: HashSet<Id> = rotated.iter().flat_map(|g| g.iter()).collect();
            let unplaced = remaining
                .into_iter()
                .filter(|id| !placed.contains(id))
                .collect_vec();
            debug!(
                rotated = rotated.len(),
                unplaced = unplaced.len(),
                "rotated prior assignment"
            );
            rotated.extend(shuffled_chunks(unplaced, size, shuffler));
            rotated
        }
        (AlgorithmKind::Manual | AlgorithmKind::Random | AlgorithmKind::Rotation, _) => {
            shuffled_chunks(remaining, size, shuffler)
        }
    };
    groups.extend(formed);
    groups
}

/// Students from `students` that no group mentions, in roster order.
pub fn unassigned(groups: &[Group], students: &[Student]) -> Vec<Id> {
    let assigned: HashSet<Id> = groups.iter().flat_map(|g| g.iter()).collect();
    students
        .iter()
        .map(|s| s.id)
        .filter(|id| !assigned.contains(id))
        .collect()
}

/// Pairs mode only: a single unassigned student joins the first pair.
/// Returns the absorbed student.
pub fn apply_fail_safe(
    groups: &mut [Group],
    students: &[Student],
    mode: GroupingMode,
) -> Option<Id> {
    if mode != GroupingMode::Pairs {
        return None;
    }
    match unassigned(groups, students).as_slice() {
        [] => None,
        [leftover] => match groups.iter_mut().find(|g| g.len() == 2) {
            Some(pair) => {
                debug!(student_id = leftover, group = %pair, "absorbing leftover student");
                pair.push(*leftover);
                Some(*leftover)
            }
            None => {
                warn!(student_id = leftover, "no pair available for leftover student");
                None
            }
        },
        leftovers => {
            warn!(count = leftovers.len(), ?leftovers, "leaving several students unassigned");
            None
        }
    }
}
