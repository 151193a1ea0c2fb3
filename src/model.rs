pub mod entity {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    pub type Id = u32;
    pub type ClassId = u32;

    /// Roster status of a student who may be grouped.
    pub const ACTIVE: &str = "active";

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Gender {
        Male,
        Female,
    }

    impl fmt::Display for Gender {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Gender::Male => write!(f, "male"),
                Gender::Female => write!(f, "female"),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Student {
        pub id: Id,
        pub class_id: ClassId,
        pub gender: Gender,
        pub status: String,
    }

    impl Student {
        pub fn new(id: Id, class_id: ClassId, gender: Gender) -> Student {
            Student {
                id,
                class_id,
                gender,
                status: ACTIVE.to_string(),
            }
        }

        pub fn is_active(&self) -> bool {
            self.status == ACTIVE
        }
    }
}

pub mod group {
    use std::fmt;

    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};

    use super::entity::Id;

    /// Student ids pinned together by an operator.
    pub type LockedGroup = Vec<Id>;

    /// Companion group. Member order is formation order.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Group {
        pub members: Vec<Id>,
    }

    impl Group {
        pub fn new(members: Vec<Id>) -> Group {
            Group { members }
        }

        pub fn len(&self) -> usize {
            self.members.len()
        }

        pub fn is_empty(&self) -> bool {
            self.members.is_empty()
        }

        pub fn contains(&self, id: Id) -> bool {
            self.members.contains(&id)
        }

        pub fn push(&mut self, id: Id) {
            self.members.push(id);
        }

        pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
            self.members.iter().copied()
        }
    }

    impl From<Vec<Id>> for Group {
        fn from(members: Vec<Id>) -> Self {
            Group { members }
        }
    }

    impl<const N: usize> From<[Id; N]> for Group {
        fn from(members: [Id; N]) -> Self {
            Group {
                members: members.to_vec(),
            }
        }
    }

    impl fmt::Display for Group {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self.members)
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Room {
        pub number: i64,
        pub group: Group,
    }

    /// Rooms in group order. Serializes as `{"<number>": [ids...]}`.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct RoomAssignment {
        pub rooms: Vec<Room>,
    }

    impl RoomAssignment {
        pub fn len(&self) -> usize {
            self.rooms.len()
        }

        pub fn is_empty(&self) -> bool {
            self.rooms.is_empty()
        }

        pub fn get(&self, room: &str) -> Option<&Group> {
            let number: i64 = room.parse().ok()?;
            self.rooms
                .iter()
                .find(|r| r.number == number)
                .map(|r| &r.group)
        }

        pub fn iter(&self) -> impl Iterator<Item = (String, &Group)> + '_ {
            self.rooms.iter().map(|r| (r.number.to_string(), &r.group))
        }
    }

    impl Serialize for RoomAssignment {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter())
        }
    }
}

pub mod condition {
    use serde::{Deserialize, Serialize};

    use super::entity::{Gender, Student};

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GroupingMode {
        #[default]
        Pairs,
        Triplets,
    }

    impl GroupingMode {
        pub fn group_size(&self) -> usize {
            match self {
                GroupingMode::Pairs => 2,
                GroupingMode::Triplets => 3,
            }
        }
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AlgorithmKind {
        Manual,
        Rotation,
        #[default]
        Random,
    }

    /// How malformed locked groups are treated by `allocate`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LockedGroupPolicy {
        /// Reject the whole allocation.
        #[default]
        Strict,
        /// Drop the offending group and carry on.
        Lenient,
    }

    /// Who may appear in a published group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct EligibilityPolicy {
        pub required_gender: Option<Gender>,
    }

    impl EligibilityPolicy {
        pub fn female_only() -> EligibilityPolicy {
            EligibilityPolicy {
                required_gender: Some(Gender::Female),
            }
        }

        pub fn any() -> EligibilityPolicy {
            EligibilityPolicy {
                required_gender: None,
            }
        }

        pub fn permits(&self, student: &Student) -> bool {
            self.required_gender
                .map_or(true, |gender| student.gender == gender)
        }
    }

    impl Default for EligibilityPolicy {
        fn default() -> Self {
            EligibilityPolicy::female_only()
        }
    }
}
