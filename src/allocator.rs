use serde::Serialize;
use tracing::{debug, info};

use crate::error::AllocationError;
use crate::grouping::{apply_fail_safe, form_groups};
use crate::model::condition::{AlgorithmKind, EligibilityPolicy, GroupingMode, LockedGroupPolicy};
use crate::model::entity::{ClassId, Student};
use crate::model::group::{Group, LockedGroup, RoomAssignment};
use crate::rooms::assign_rooms;
use crate::shuffle::{RngShuffler, Shuffler};
use crate::validate::{validate_groups, validate_locked_groups};

/// Everything one allocation run needs.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    pub class_id: ClassId,
    pub students: Vec<Student>,
    pub grouping_mode: GroupingMode,
    pub algorithm: AlgorithmKind,
    pub locked_groups: Vec<LockedGroup>,
    pub prior_assignment: Option<Vec<Group>>,
    pub room_start: i64,
    pub locked_policy: LockedGroupPolicy,
}

impl AllocationRequest {
    pub fn new(class_id: ClassId, students: Vec<Student>) -> AllocationRequest {
        AllocationRequest {
            class_id,
            students,
            grouping_mode: GroupingMode::default(),
            algorithm: AlgorithmKind::default(),
            locked_groups: Vec::new(),
            prior_assignment: None,
            room_start: 1,
            locked_policy: LockedGroupPolicy::default(),
        }
    }

    pub fn grouping_mode(mut self, mode: GroupingMode) -> Self {
        self.grouping_mode = mode;
        self
    }

    pub fn algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn locked_groups(mut self, locked_groups: Vec<LockedGroup>) -> Self {
        self.locked_groups = locked_groups;
        self
    }

    pub fn prior_assignment(mut self, prior: Option<Vec<Group>>) -> Self {
        self.prior_assignment = prior;
        self
    }

    pub fn room_start(mut self, room_start: i64) -> Self {
        self.room_start = room_start;
        self
    }

    pub fn locked_policy(mut self, policy: LockedGroupPolicy) -> Self {
        self.locked_policy = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    Allocated,
    /// Fewer than two students; nothing was grouped.
    InsufficientStudents,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    pub status: AllocationStatus,
    pub groups: Vec<Group>,
    pub room_assignments: RoomAssignment,
    pub student_count: usize,
    pub group_count: usize,
}

impl AllocationResult {
    pub fn insufficient(student_count: usize) -> AllocationResult {
        AllocationResult {
            status: AllocationStatus::InsufficientStudents,
            groups: Vec::new(),
            room_assignments: RoomAssignment::default(),
            student_count,
            group_count: 0,
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.status == AllocationStatus::Allocated
    }
}

/// Splits a class roster into companion groups and gives each a room.
#[derive(Debug, Clone)]
pub struct CompanionsAllocator<S> {
    shuffler: S,
    policy: EligibilityPolicy,
}

impl CompanionsAllocator<RngShuffler<rand::rngs::SmallRng>> {
    pub fn from_entropy(policy: EligibilityPolicy) -> Self {
        CompanionsAllocator::new(RngShuffler::from_entropy(), policy)
    }
}

impl<S: Shuffler> CompanionsAllocator<S> {
    pub fn new(shuffler: S, policy: EligibilityPolicy) -> CompanionsAllocator<S> {
        CompanionsAllocator { shuffler, policy }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Strict locked-group check, independent of `request.locked_policy`.
    pub fn validate_locked_groups(&self, request: &AllocationRequest) -> Result<(), AllocationError> {
        validate_locked_groups(
            &request.locked_groups,
            &request.students,
            request.grouping_mode,
        )
    }

    /// Groups without fail-safe or validation; malformed locked groups are dropped.
    pub fn form_groups(&mut self, request: &AllocationRequest) -> Vec<Group> {
        form_groups(
            &request.students,
            request.grouping_mode,
            request.algorithm,
            &request.locked_groups,
            request.prior_assignment.as_deref(),
            &mut self.shuffler,
        )
    }

    pub fn allocate(&mut self, request: &AllocationRequest) -> Result<AllocationResult, AllocationError> {
        let student_count = request.students.len();
        if student_count < 2 {
            info!(
                class_id = request.class_id,
                student_count, "not enough students to allocate companions"
            );
            return Ok(AllocationResult::insufficient(student_count));
        }

        if request.locked_policy == LockedGroupPolicy::Strict {
            self.validate_locked_groups(request)?;
        }

        let mut groups = self.form_groups(request);
        if let Some(student_id) =
            apply_fail_safe(&mut groups, &request.students, request.grouping_mode)
        {
            debug!(class_id = request.class_id, student_id, "fail-safe absorbed leftover");
        }

        validate_groups(&groups, &request.students, request.class_id, &self.policy)?;

        let room_assignments = assign_rooms(&groups, request.room_start);
        info!(
            class_id = request.class_id,
            algorithm = ?request.algorithm,
            mode = ?request.grouping_mode,
            student_count,
            group_count = groups.len(),
            "allocated companions"
        );
        Ok(AllocationResult {
            status: AllocationStatus::Allocated,
            group_count: groups.len(),
            groups,
            room_assignments,
            student_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;
    use crate::model::entity::{Gender, Id};
    use crate::shuffle::KeepOrder;

    fn roster(ids: impl IntoIterator<Item = Id>) -> Vec<Student> {
        ids.into_iter()
            .map(|id| Student::new(id, 1, Gender::Female))
            .collect()
    }

    fn seeded() -> CompanionsAllocator<RngShuffler<rand::rngs::SmallRng>> {
        CompanionsAllocator::new(RngShuffler::seeded(11), EligibilityPolicy::female_only())
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn too_few_students_is_not_an_error(#[case] n: Id) {
        // Even a malformed locked group does not matter here.
        let request = AllocationRequest::new(1, roster(1..=n)).locked_groups(vec![vec![42]]);
        let result = seeded().allocate(&request).unwrap();
        assert_eq!(result, AllocationResult::insufficient(n as usize));
        assert!(!result.is_allocated());
        assert!(result.room_assignments.is_empty());
    }

    #[test]
    fn odd_pairs_grow_one_triplet() {
        let request = AllocationRequest::new(1, roster(1..=7)).room_start(10);
        let result = seeded().allocate(&request).unwrap();

        assert!(result.is_allocated());
        assert_eq!(result.student_count, 7);
        assert_eq!(result.group_count, 3);
        let sizes: Vec<usize> = result.groups.iter().map(Group::len).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 7);
        assert_eq!(sizes.iter().filter(|&&n| n == 3).count(), 1);
        assert_eq!(result.room_assignments.get("10"), Some(&result.groups[0]));
        assert_eq!(result.room_assignments.get("12"), Some(&result.groups[2]));
    }

    #[test]
    fn fail_safe_absorbs_student_orphaned_by_locked_groups() {
        // Locked [1, 2] leaves [3] alone after chunking.
        let request = AllocationRequest::new(1, roster(1..=3)).locked_groups(vec![vec![1, 2]]);
        let result = CompanionsAllocator::new(KeepOrder, EligibilityPolicy::any())
            .allocate(&request)
            .unwrap();
        assert_eq!(result.groups, vec![Group::from([1, 2, 3])]);
    }

    #[test]
    fn triplets_leave_a_lone_student_unassigned() {
        let request = AllocationRequest::new(1, roster(1..=4))
            .grouping_mode(GroupingMode::Triplets)
            .locked_groups(vec![vec![1, 2, 3]]);
        let result = CompanionsAllocator::new(KeepOrder, EligibilityPolicy::any())
            .allocate(&request)
            .unwrap();
        assert_eq!(result.groups, vec![Group::from([1, 2, 3])]);
        assert_eq!(result.group_count, 1);
    }

    #[test]
    fn strict_policy_rejects_bad_locked_group() {
        let request = AllocationRequest::new(1, roster(1..=4)).locked_groups(vec![vec![1, 9]]);
        let err = seeded().allocate(&request).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InvalidLockedGroupMember {
                student_id: 9,
                group: Group::from([1, 9]),
            }
        );
    }

    #[test]
    fn lenient_policy_drops_bad_locked_group() {
        let request = AllocationRequest::new(1, roster(1..=4))
            .locked_groups(vec![vec![1, 9], vec![4, 3]])
            .locked_policy(LockedGroupPolicy::Lenient);
        let result = CompanionsAllocator::new(KeepOrder, EligibilityPolicy::any())
            .allocate(&request)
            .unwrap();
        assert_eq!(result.groups, vec![Group::from([4, 3]), Group::from([1, 2])]);
    }

    #[test]
    fn locked_pair_is_first_and_exclusive() {
        let request = AllocationRequest::new(1, roster(1..=10)).locked_groups(vec![vec![5, 6]]);
        let result = seeded().allocate(&request).unwrap();
        assert_eq!(result.groups[0], Group::from([5, 6]));
        assert_eq!(result.room_assignments.get("1"), Some(&Group::from([5, 6])));
        for group in &result.groups[1..] {
            assert!(!group.contains(5));
            assert!(!group.contains(6));
        }
    }

    #[test]
    fn rotation_follows_prior_day() {
        let request = AllocationRequest::new(1, roster(1..=4))
            .algorithm(AlgorithmKind::Rotation)
            .prior_assignment(Some(vec![Group::from([1, 2]), Group::from([3, 4])]))
            .room_start(101);
        let result = seeded().allocate(&request).unwrap();
        assert_eq!(result.groups, vec![Group::from([2, 3]), Group::from([4, 1])]);
        assert_eq!(
            serde_json::to_value(&result.room_assignments).unwrap(),
            serde_json::json!({"101": [2, 3], "102": [4, 1]})
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some(vec![]))]
    fn rotation_without_prior_falls_back_to_random(#[case] prior: Option<Vec<Group>>) {
        let students = roster(1..=9);
        let request = AllocationRequest::new(1, students.clone())
            .algorithm(AlgorithmKind::Rotation)
            .prior_assignment(prior);
        let result = seeded().allocate(&request).unwrap();

        let ids: HashSet<Id> = result.groups.iter().flat_map(|g| g.iter()).collect();
        assert_eq!(ids, students.iter().map(|s| s.id).collect());

        let random = AllocationRequest::new(1, students).algorithm(AlgorithmKind::Random);
        assert_eq!(seeded().allocate(&random).unwrap().groups, result.groups);
    }

    #[test]
    fn male_student_fails_female_only_policy() {
        let mut students = roster(1..=4);
        students[1].gender = Gender::Male;
        let request = AllocationRequest::new(1, students);
        let err = seeded().allocate(&request).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::GenderConstraintViolation { student_id: 2, .. }
        ));
        assert!(err.group().contains(2));
    }

    #[test]
    fn student_from_another_class_is_rejected() {
        let mut students = roster(1..=4);
        students[3].class_id = 2;
        let err = seeded()
            .allocate(&AllocationRequest::new(1, students))
            .unwrap_err();
        assert_eq!(err.student_id(), Some(4));
        assert!(matches!(err, AllocationError::ClassMismatch { .. }));
    }

    #[test]
    fn entropy_allocator_still_partitions() {
        let mut allocator = CompanionsAllocator::from_entropy(EligibilityPolicy::any());
        assert_eq!(allocator.policy(), &EligibilityPolicy::any());

        let result = allocator
            .allocate(&AllocationRequest::new(1, roster(1..=11)))
            .unwrap();
        let mut ids: Vec<Id> = result.groups.iter().flat_map(|g| g.iter()).collect();
        ids.sort();
        assert_eq!(ids, (1..=11).collect::<Vec<Id>>());
        assert_eq!(result.group_count, 5);
    }

    #[test]
    fn result_serializes_for_publication() {
        let request = AllocationRequest::new(1, roster(1..=4)).room_start(7);
        let result = CompanionsAllocator::new(KeepOrder, EligibilityPolicy::female_only())
            .allocate(&request)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "status": "allocated",
                "groups": [[1, 2], [3, 4]],
                "room_assignments": {"7": [1, 2], "8": [3, 4]},
                "student_count": 4,
                "group_count": 2,
            })
        );
    }
}
