// Copyright (c) 2025 - Cowboy AI, Inc.
//! Backup Plan Rules
//!
//! Two plans protect the deployment: a daily snapshot of the admin host
//! with a cold-storage tier, and continuous point-in-time backup of the
//! content bucket.

use chrono::{Duration, NaiveTime, Timelike};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::invariants::{ValidationError, ValidationResult};

/// Minimum days between cold storage transition and deletion
pub const MIN_COLD_STORAGE_DAYS: u32 = 90;

/// Longest retention allowed for continuous backups
pub const MAX_CONTINUOUS_RETENTION_DAYS: u32 = 35;

/// When a backup job starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Schedule {
    /// Every day at the given UTC time
    DailyAt(NaiveTime),
    /// No schedule, backups stream continuously
    Continuous,
}

impl Schedule {
    /// Every day at `hour:minute` UTC
    pub fn daily(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self::DailyAt)
            .ok_or_else(|| {
                ValidationError::BusinessRule(format!(
                    "Invalid backup time {:02}:{:02}",
                    hour, minute
                ))
            })
    }

    /// Six-field cron expression, e.g. `cron(10 4 * * ? *)`
    pub fn expression(&self) -> Option<String> {
        match self {
            Self::DailyAt(time) => Some(format!("cron({} {} * * ? *)", time.minute(), time.hour())),
            Self::Continuous => None,
        }
    }
}

/// Recovery point retention
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Lifecycle {
    pub move_to_cold_storage_after_days: Option<u32>,
    pub delete_after_days: Option<u32>,
}

/// One rule of a backup plan
#[derive(Debug, Clone, PartialEq)]
pub struct BackupRule {
    pub name: String,
    pub schedule: Schedule,
    pub start_window: Duration,
    pub completion_window: Duration,
    pub lifecycle: Lifecycle,
}

impl BackupRule {
    /// Daily 04:10 UTC host snapshot, cold after 30 days, deleted after 120
    pub fn daily_host(name: impl Into<String>) -> Result<Self, ValidationError> {
        let rule = Self {
            name: name.into(),
            schedule: Schedule::daily(4, 10)?,
            start_window: Duration::hours(1),
            completion_window: Duration::hours(4),
            lifecycle: Lifecycle {
                move_to_cold_storage_after_days: Some(30),
                delete_after_days: Some(120),
            },
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Continuous bucket backup kept for 30 days
    pub fn continuous_bucket(name: impl Into<String>) -> Result<Self, ValidationError> {
        let rule = Self {
            name: name.into(),
            schedule: Schedule::Continuous,
            start_window: Duration::hours(1),
            completion_window: Duration::hours(4),
            lifecycle: Lifecycle {
                move_to_cold_storage_after_days: None,
                delete_after_days: Some(30),
            },
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn is_continuous(&self) -> bool {
        self.schedule == Schedule::Continuous
    }

    /// Check windows and retention against provider limits
    pub fn validate(&self) -> ValidationResult {
        if self.start_window < Duration::hours(1) {
            return Err(ValidationError::BusinessRule(format!(
                "Backup rule {} start window must be at least 60 minutes",
                self.name
            )));
        }
        if self.completion_window <= self.start_window {
            return Err(ValidationError::BusinessRule(format!(
                "Backup rule {} must complete after its start window",
                self.name
            )));
        }

        let Lifecycle {
            move_to_cold_storage_after_days: cold,
            delete_after_days: delete,
        } = self.lifecycle;

        if let (Some(cold), Some(delete)) = (cold, delete) {
            if delete < cold + MIN_COLD_STORAGE_DAYS {
                return Err(ValidationError::BusinessRule(format!(
                    "Backup rule {} deletes after {} days, before {} days in cold storage",
                    self.name, delete, MIN_COLD_STORAGE_DAYS
                )));
            }
        }

        if self.is_continuous() {
            if cold.is_some() {
                return Err(ValidationError::BusinessRule(format!(
                    "Continuous backup rule {} cannot use cold storage",
                    self.name
                )));
            }
            if delete.map_or(true, |days| days > MAX_CONTINUOUS_RETENTION_DAYS) {
                return Err(ValidationError::BusinessRule(format!(
                    "Continuous backup rule {} must be deleted within {} days",
                    self.name, MAX_CONTINUOUS_RETENTION_DAYS
                )));
            }
        }

        Ok(())
    }

    /// `BackupPlanRule` entry targeting `vault`
    pub fn to_property(&self, vault: Value) -> Value {
        let mut rule = Map::new();
        rule.insert("RuleName".to_string(), json!(self.name));
        rule.insert("TargetBackupVault".to_string(), vault);
        rule.insert(
            "StartWindowMinutes".to_string(),
            json!(self.start_window.num_minutes()),
        );
        rule.insert(
            "CompletionWindowMinutes".to_string(),
            json!(self.completion_window.num_minutes()),
        );

        if let Some(expression) = self.schedule.expression() {
            rule.insert("ScheduleExpression".to_string(), json!(expression));
        }
        if self.is_continuous() {
            rule.insert("EnableContinuousBackup".to_string(), json!(true));
        }

        let mut lifecycle = Map::new();
        if let Some(days) = self.lifecycle.move_to_cold_storage_after_days {
            lifecycle.insert("MoveToColdStorageAfterDays".to_string(), json!(days));
        }
        if let Some(days) = self.lifecycle.delete_after_days {
            lifecycle.insert("DeleteAfterDays".to_string(), json!(days));
        }
        if !lifecycle.is_empty() {
            rule.insert("Lifecycle".to_string(), Value::Object(lifecycle));
        }

        Value::Object(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_host_rule() {
        let rule = BackupRule::daily_host("daily").unwrap();
        assert_eq!(rule.schedule.expression().as_deref(), Some("cron(10 4 * * ? *)"));

        let property = rule.to_property(json!("vault"));
        assert_eq!(property["StartWindowMinutes"], 60);
        assert_eq!(property["CompletionWindowMinutes"], 240);
        assert_eq!(property["Lifecycle"]["MoveToColdStorageAfterDays"], 30);
        assert_eq!(property["Lifecycle"]["DeleteAfterDays"], 120);
        assert!(property.get("EnableContinuousBackup").is_none());
    }

    #[test]
    fn test_continuous_bucket_rule() {
        let rule = BackupRule::continuous_bucket("continuous").unwrap();
        assert!(rule.is_continuous());

        let property = rule.to_property(json!("vault"));
        assert_eq!(property["EnableContinuousBackup"], true);
        assert_eq!(property["Lifecycle"]["DeleteAfterDays"], 30);
        assert!(property.get("ScheduleExpression").is_none());
        assert!(property["Lifecycle"].get("MoveToColdStorageAfterDays").is_none());
    }

    #[test]
    fn test_short_cold_storage_rejected() {
        let mut rule = BackupRule::daily_host("daily").unwrap();
        rule.lifecycle.delete_after_days = Some(60);
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_long_continuous_retention_rejected() {
        let mut rule = BackupRule::continuous_bucket("continuous").unwrap();
        rule.lifecycle.delete_after_days = Some(36);
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_invalid_time() {
        assert!(Schedule::daily(24, 0).is_err());
        assert_eq!(
            Schedule::daily(0, 5).unwrap().expression().as_deref(),
            Some("cron(5 0 * * ? *)")
        );
    }
}
