use std::collections::{HashMap, HashSet};

use crate::error::AllocationError;
use crate::model::condition::{EligibilityPolicy, GroupingMode};
use crate::model::entity::{ClassId, Id, Student};
use crate::model::group::{Group, LockedGroup};

/// Checks one locked group against the roster and the ids already pinned.
pub(crate) fn check_locked_group(
    locked: &[Id],
    roster: &HashSet<Id>,
    pinned: &HashSet<Id>,
    mode: GroupingMode,
) -> Result<(), AllocationError> {
    let expected = mode.group_size();
    if locked.len() != expected {
        return Err(AllocationError::InvalidLockedGroupSize {
            group: Group::new(locked.to_vec()),
            expected,
            actual: locked.len(),
        });
    }
    let mut seen = HashSet::with_capacity(locked.len());
    for &student_id in locked {
        if !roster.contains(&student_id) {
            return Err(AllocationError::InvalidLockedGroupMember {
                student_id,
                group: Group::new(locked.to_vec()),
            });
        }
        if pinned.contains(&student_id) || !seen.insert(student_id) {
            return Err(AllocationError::DuplicateLockedMember {
                student_id,
                group: Group::new(locked.to_vec()),
            });
        }
    }
    Ok(())
}

/// Fails on the first locked group that has the wrong size, names a student
/// missing from `students`, or pins a student already pinned.
pub fn validate_locked_groups(
    locked_groups: &[LockedGroup],
    students: &[Student],
    mode: GroupingMode,
) -> Result<(), AllocationError> {
    let roster: HashSet<Id> = students.iter().map(|s| s.id).collect();
    let mut pinned = HashSet::new();
    for locked in locked_groups {
        check_locked_group(locked, &roster, &pinned, mode)?;
        pinned.extend(locked.iter().copied());
    }
    Ok(())
}

/// Final integrity pass over a finished grouping, in group order.
pub fn validate_groups(
    groups: &[Group],
    students: &[Student],
    class_id: ClassId,
    policy: &EligibilityPolicy,
) -> Result<(), AllocationError> {
    let roster: HashMap<Id, &Student> = students.iter().map(|s| (s.id, s)).collect();
    let mut assigned = HashSet::new();

    for group in groups {
        for student_id in group.iter() {
            if !assigned.insert(student_id) {
                return Err(AllocationError::DuplicateStudentInResult {
                    student_id,
                    group: group.clone(),
                });
            }
            let student = roster
                .get(&student_id)
                .ok_or_else(|| AllocationError::UnknownStudentInResult {
                    student_id,
                    group: group.clone(),
                })?;
            if student.class_id != class_id {
                return Err(AllocationError::ClassMismatch {
                    student_id,
                    expected: class_id,
                    actual: student.class_id,
                    group: group.clone(),
                });
            }
            if let Some(required) = policy.required_gender {
                if student.gender != required {
                    return Err(AllocationError::GenderConstraintViolation {
                        student_id,
                        required,
                        actual: student.gender,
                        group: group.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
