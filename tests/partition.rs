use std::collections::HashSet;

use companions::{
    AlgorithmKind, AllocationRequest, CompanionsAllocator, EligibilityPolicy, Gender, Group,
    GroupingMode, Id, RngShuffler, Student,
};
use proptest::prelude::*;

fn roster(n: Id) -> Vec<Student> {
    (1..=n).map(|id| Student::new(id, 1, Gender::Female)).collect()
}

fn mode() -> impl Strategy<Value = GroupingMode> {
    prop_oneof![Just(GroupingMode::Pairs), Just(GroupingMode::Triplets)]
}

fn algorithm() -> impl Strategy<Value = AlgorithmKind> {
    prop_oneof![
        Just(AlgorithmKind::Manual),
        Just(AlgorithmKind::Random),
        Just(AlgorithmKind::Rotation),
    ]
}

proptest! {
    #[test]
    fn groups_partition_the_roster(
        n in 2u32..60,
        mode in mode(),
        algorithm in algorithm(),
        seed in any::<u64>(),
        with_prior in any::<bool>(),
    ) {
        let students = roster(n);
        // Yesterday's pairs over the first half of the class.
        let prior: Vec<Group> = (1..=n / 2)
            .collect::<Vec<Id>>()
            .chunks(2)
            .filter(|c| c.len() == 2)
            .map(|c| Group::new(c.to_vec()))
            .collect();
        let request = AllocationRequest::new(1, students.clone())
            .grouping_mode(mode)
            .algorithm(algorithm)
            .prior_assignment(with_prior.then_some(prior))
            .room_start(100);

        let mut allocator =
            CompanionsAllocator::new(RngShuffler::seeded(seed), EligibilityPolicy::female_only());
        let result = allocator.allocate(&request).unwrap();

        let mut seen = HashSet::new();
        for group in &result.groups {
            prop_assert!(group.len() >= 2);
            for id in group.iter() {
                prop_assert!(seen.insert(id), "student {} grouped twice", id);
                prop_assert!((1..=n).contains(&id));
            }
        }
        prop_assert_eq!(result.group_count, result.groups.len());
        prop_assert_eq!(result.room_assignments.len(), result.groups.len());
        for (i, group) in result.groups.iter().enumerate() {
            let room = (100 + i).to_string();
            prop_assert_eq!(result.room_assignments.get(&room), Some(group));
        }
    }

    #[test]
    fn pairs_leave_no_one_behind(n in 2u32..60, seed in any::<u64>()) {
        let request = AllocationRequest::new(1, roster(n)).algorithm(AlgorithmKind::Random);
        let mut allocator =
            CompanionsAllocator::new(RngShuffler::seeded(seed), EligibilityPolicy::any());
        let result = allocator.allocate(&request).unwrap();

        let grouped: usize = result.groups.iter().map(Group::len).sum();
        prop_assert_eq!(grouped, n as usize);
        prop_assert_eq!(result.group_count, n as usize / 2);
        prop_assert!(result.groups.iter().all(|g| g.len() == 2 || g.len() == 3));
    }
}
