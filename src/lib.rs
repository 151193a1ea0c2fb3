//! Companion allocation: splits a class roster into pairs or triplets for a
//! day, keeping operator-pinned groups, and numbers a room for each group.

pub mod allocator;
pub mod config;
pub mod error;
pub mod grouping;
pub mod model;
pub mod planner;
pub mod provider;
pub mod rooms;
pub mod rotation;
pub mod shuffle;
pub mod validate;

pub use allocator::{AllocationRequest, AllocationResult, AllocationStatus, CompanionsAllocator};
pub use config::{AttendanceConfig, CompanionsConfig, ConfigError};
pub use error::AllocationError;
pub use model::condition::{AlgorithmKind, EligibilityPolicy, GroupingMode, LockedGroupPolicy};
pub use model::entity::{ClassId, Gender, Id, Student};
pub use model::group::{Group, LockedGroup, RoomAssignment};
pub use planner::{CompanionsPlanner, PlanError};
pub use provider::{AttendanceSource, PublicationHistory, RosterProvider};
pub use shuffle::{KeepOrder, RngShuffler, Shuffler};
