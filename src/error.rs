use thiserror::Error;

use crate::model::entity::{ClassId, Gender, Id};
use crate::model::group::Group;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllocationError {
    #[error("locked group {group} has {actual} members, expected {expected}")]
    InvalidLockedGroupSize {
        group: Group,
        expected: usize,
        actual: usize,
    },
    #[error("locked group {group} references unknown student {student_id}")]
    InvalidLockedGroupMember { student_id: Id, group: Group },
    #[error("student {student_id} is pinned more than once (locked group {group})")]
    DuplicateLockedMember { student_id: Id, group: Group },
    #[error("student {student_id} appears more than once (group {group})")]
    DuplicateStudentInResult { student_id: Id, group: Group },
    #[error("student {student_id} in group {group} is not on the roster")]
    UnknownStudentInResult { student_id: Id, group: Group },
    #[error("student {student_id} in group {group} belongs to class {actual}, expected {expected}")]
    ClassMismatch {
        student_id: Id,
        expected: ClassId,
        actual: ClassId,
        group: Group,
    },
    #[error("student {student_id} in group {group} is {actual}, only {required} students may be grouped")]
    GenderConstraintViolation {
        student_id: Id,
        required: Gender,
        actual: Gender,
        group: Group,
    },
}

impl AllocationError {
    /// The student the failed rule was checked against, if any.
    pub fn student_id(&self) -> Option<Id> {
        match self {
            AllocationError::InvalidLockedGroupSize { .. } => None,
            AllocationError::InvalidLockedGroupMember { student_id, .. }
            | AllocationError::DuplicateLockedMember { student_id, .. }
            | AllocationError::DuplicateStudentInResult { student_id, .. }
            | AllocationError::UnknownStudentInResult { student_id, .. }
            | AllocationError::ClassMismatch { student_id, .. }
            | AllocationError::GenderConstraintViolation { student_id, .. } => Some(*student_id),
        }
    }

    pub fn group(&self) -> &Group {
        match self {
            AllocationError::InvalidLockedGroupSize { group, .. }
            | AllocationError::InvalidLockedGroupMember { group, .. }
            | AllocationError::DuplicateLockedMember { group, .. }
            | AllocationError::DuplicateStudentInResult { group, .. }
            | AllocationError::UnknownStudentInResult { group, .. }
            | AllocationError::ClassMismatch { group, .. }
            | AllocationError::GenderConstraintViolation { group, .. } => group,
        }
    }

    /// Errors raised while checking operator-supplied locked groups.
    pub fn is_locked_group_error(&self) -> bool {
        matches!(
            self,
            AllocationError::InvalidLockedGroupSize { .. }
                | AllocationError::InvalidLockedGroupMember { .. }
                | AllocationError::DuplicateLockedMember { .. }
        )
    }
}
