//! Collaborators the planner reads from: class rosters and previously
//! published groups. The in-memory implementations back tests and callers
//! that already hold the data.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::AttendanceConfig;
use crate::model::entity::{ClassId, Id, Student};
use crate::model::group::Group;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceSource {
    /// Every active student in the class.
    #[default]
    All,
    /// Active students who meet the attendance threshold.
    CommittedOnly,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("roster unavailable for class {class_id}: {reason}")]
    RosterUnavailable { class_id: ClassId, reason: String },
    #[error("publication history unavailable for class {class_id}: {reason}")]
    HistoryUnavailable { class_id: ClassId, reason: String },
}

pub trait RosterProvider {
    /// `attendance` only applies to `AttendanceSource::CommittedOnly`.
    fn active_students(
        &self,
        class_id: ClassId,
        source: AttendanceSource,
        attendance: &AttendanceConfig,
    ) -> Result<Vec<Student>, ProviderError>;
}

pub trait PublicationHistory {
    /// Latest groups published for a date strictly before `date`.
    fn latest_before(
        &self,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<Option<Vec<Group>>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: Id,
    pub date: NaiveDate,
    pub attended: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    sessions: u32,
    attended: u32,
}

impl Tally {
    fn rate(&self) -> Option<f64> {
        (self.sessions > 0).then(|| f64::from(self.attended) / f64::from(self.sessions))
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryRoster {
    students: Vec<Student>,
    attendance: Vec<AttendanceRecord>,
    as_of: NaiveDate,
}

impl InMemoryRoster {
    /// Attendance windows end on `as_of`.
    pub fn new(as_of: NaiveDate) -> InMemoryRoster {
        InMemoryRoster {
            students: Vec::new(),
            attendance: Vec::new(),
            as_of,
        }
    }

    pub fn with_students(mut self, students: impl IntoIterator<Item = Student>) -> Self {
        self.students.extend(students);
        self
    }

    pub fn record(&mut self, student_id: Id, date: NaiveDate, attended: bool) {
        self.attendance.push(AttendanceRecord {
            student_id,
            date,
            attended,
        });
    }

    fn window_start(&self, window_days: u32) -> NaiveDate {
        let span = Days::new(u64::from(window_days.saturating_sub(1)));
        self.as_of.checked_sub_days(span).unwrap_or(NaiveDate::MIN)
    }

    fn tallies(&self, window_days: u32) -> HashMap<Id, Tally> {
        let start = self.window_start(window_days);
        let mut tallies: HashMap<Id, Tally> = HashMap::new();
        for record in self
            .attendance
            .iter()
            .filter(|r| start <= r.date && r.date <= self.as_of)
        {
            let tally = tallies.entry(record.student_id).or_default();
            tally.sessions += 1;
            if record.attended {
                tally.attended += 1;
            }
        }
        tallies
    }

    fn is_committed(student: &Student, tallies: &HashMap<Id, Tally>, min_rate: f64) -> bool {
        tallies
            .get(&student.id)
            .and_then(Tally::rate)
            .is_some_and(|rate| rate >= min_rate)
    }
}

impl RosterProvider for InMemoryRoster {
    fn active_students(
        &self,
        class_id: ClassId,
        source: AttendanceSource,
        attendance: &AttendanceConfig,
    ) -> Result<Vec<Student>, ProviderError> {
        let active = self
            .students
            .iter()
            .filter(|s| s.class_id == class_id && s.is_active());
        let students: Vec<Student> = match source {
            AttendanceSource::All => active.cloned().collect(),
            AttendanceSource::CommittedOnly => {
                let tallies = self.tallies(attendance.window_days);
                active
                    .filter(|s| Self::is_committed(s, &tallies, attendance.min_rate))
                    .cloned()
                    .collect()
            }
        };
        debug!(class_id, ?source, count = students.len(), "loaded roster");
        Ok(students)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPublications {
    published: HashMap<ClassId, BTreeMap<NaiveDate, Vec<Group>>>,
}

impl InMemoryPublications {
    pub fn new() -> InMemoryPublications {
        InMemoryPublications::default()
    }

    /// Replaces whatever was published for the same class and date.
    pub fn publish(&mut self, class_id: ClassId, date: NaiveDate, groups: Vec<Group>) {
        self.published
            .entry(class_id)
            .or_default()
            .insert(date, groups);
    }
}

impl PublicationHistory for InMemoryPublications {
    fn latest_before(
        &self,
        class_id: ClassId,
        date: NaiveDate,
    ) -> Result<Option<Vec<Group>>, ProviderError> {
        Ok(self
            .published
            .get(&class_id)
            .and_then(|by_date| by_date.range(..date).next_back())
            .map(|(_, groups)| groups.clone()))
    }
}
