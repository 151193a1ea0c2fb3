use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::allocator::{AllocationRequest, AllocationResult, CompanionsAllocator};
use crate::config::CompanionsConfig;
use crate::error::AllocationError;
use crate::model::condition::AlgorithmKind;
use crate::model::entity::ClassId;
use crate::model::group::LockedGroup;
use crate::provider::{ProviderError, PublicationHistory, RosterProvider};
use crate::shuffle::Shuffler;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Loads a class roster (and yesterday's groups when rotating) and runs the
/// allocator over it.
pub struct CompanionsPlanner<R, P, S> {
    roster: R,
    history: P,
    allocator: CompanionsAllocator<S>,
    config: CompanionsConfig,
}

impl<R, P, S> CompanionsPlanner<R, P, S>
where
    R: RosterProvider,
    P: PublicationHistory,
    S: Shuffler,
{
    pub fn new(roster: R, history: P, shuffler: S, config: CompanionsConfig) -> Self {
        let allocator = CompanionsAllocator::new(shuffler, config.eligibility);
        CompanionsPlanner {
            roster,
            history,
            allocator,
            config,
        }
    }

    pub fn config(&self) -> &CompanionsConfig {
        &self.config
    }

    /// Builds the request the allocator would receive for `class_id` on `date`.
    pub fn request(
        &self,
        class_id: ClassId,
        date: NaiveDate,
        locked_groups: Vec<LockedGroup>,
    ) -> Result<AllocationRequest, PlanError> {
        let students = self
            .roster
            .active_students(
                class_id,
                self.config.attendance_source,
                &self.config.attendance,
            )?;

        let prior = match self.config.algorithm {
            AlgorithmKind::Rotation => self.history.latest_before(class_id, date)?,
            AlgorithmKind::Manual | AlgorithmKind::Random => None,
        };
        debug!(
            class_id,
            %date,
            students = students.len(),
            has_prior = prior.is_some(),
            "prepared allocation request"
        );

        Ok(AllocationRequest::new(class_id, students)
            .grouping_mode(self.config.grouping_mode)
            .algorithm(self.config.algorithm)
            .locked_groups(locked_groups)
            .prior_assignment(prior)
            .room_start(self.config.room_start)
            .locked_policy(self.config.locked_policy))
    }

    pub fn plan(
        &mut self,
        class_id: ClassId,
        date: NaiveDate,
        locked_groups: Vec<LockedGroup>,
    ) -> Result<AllocationResult, PlanError> {
        let request = self.request(class_id, date, locked_groups)?;
        let result = self.allocator.allocate(&request)?;
        info!(
            class_id,
            %date,
            status = ?result.status,
            group_count = result.group_count,
            "planned companions"
        );
        Ok(result)
    }
}
