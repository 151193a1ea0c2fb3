use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::condition::{AlgorithmKind, EligibilityPolicy, GroupingMode, LockedGroupPolicy};
use crate::provider::AttendanceSource;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse companions config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid companions config: {0}")]
    Invalid(String),
}

/// Trailing-window attendance filter used for `committed_only` rosters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    pub window_days: u32,
    pub min_rate: f64,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        AttendanceConfig {
            window_days: 14,
            min_rate: 0.6,
        }
    }
}

/// Per-class companions settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionsConfig {
    pub grouping_mode: GroupingMode,
    pub algorithm: AlgorithmKind,
    pub room_start: i64,
    pub attendance_source: AttendanceSource,
    pub locked_policy: LockedGroupPolicy,
    pub eligibility: EligibilityPolicy,
    pub attendance: AttendanceConfig,
}

impl Default for CompanionsConfig {
    fn default() -> Self {
        CompanionsConfig {
            grouping_mode: GroupingMode::Pairs,
            algorithm: AlgorithmKind::Random,
            room_start: 1,
            attendance_source: AttendanceSource::All,
            locked_policy: LockedGroupPolicy::Strict,
            eligibility: EligibilityPolicy::female_only(),
            attendance: AttendanceConfig::default(),
        }
    }
}

impl CompanionsConfig {
    pub fn from_json(json: &str) -> Result<CompanionsConfig, ConfigError> {
        let config: CompanionsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attendance.window_days == 0 {
            return Err(ConfigError::Invalid(
                "attendance.window_days must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.attendance.min_rate) {
            return Err(ConfigError::Invalid(format!(
                "attendance.min_rate must be within [0, 1], got {}",
                self.attendance.min_rate
            )));
        }
        Ok(())
    }
}
