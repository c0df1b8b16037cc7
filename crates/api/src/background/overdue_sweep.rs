//! Daily overdue sweep for projects and tasks.
//!
//! Sleeps until the next configured UTC wall-clock time, then runs both
//! sweeps concurrently. A failure in one sweep does not affect the other.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use projman_core::lifecycle::{ProjectLifecycle, TaskLifecycle};
use projman_core::store::Store;
use tokio_util::sync::CancellationToken;

use crate::config::{parse_or, ConfigError};

/// Default run time: midnight UTC.
const DEFAULT_SWEEP_AT: NaiveTime = NaiveTime::MIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    pub enabled: bool,
    /// UTC time of day at which the sweep fires.
    pub at: NaiveTime,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            at: DEFAULT_SWEEP_AT,
        }
    }
}

impl SweepConfig {
    /// Load the schedule from environment variables.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `OVERDUE_SWEEP_ENABLED` | `true`  |
    /// | `OVERDUE_SWEEP_AT`      | `00:00` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&crate::config::env_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = parse_or(lookup, "OVERDUE_SWEEP_ENABLED", true)?;
        let at = match lookup("OVERDUE_SWEEP_AT") {
            None => DEFAULT_SWEEP_AT,
            Some(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| {
                ConfigError::Invalid {
                    var: "OVERDUE_SWEEP_AT",
                    reason: format!("{e} (expected HH:MM)"),
                    value,
                }
            })?,
        };
        Ok(Self { enabled, at })
    }
}

/// The first instant strictly after `now` whose UTC time of day is `at`.
pub fn next_run(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// Run the sweep loop until `cancel` is triggered.
pub async fn run<S: Store>(
    projects: ProjectLifecycle<S>,
    tasks: TaskLifecycle<S>,
    config: SweepConfig,
    cancel: CancellationToken,
) {
    if !config.enabled {
        tracing::info!("Overdue sweep disabled");
        return;
    }

    tracing::info!(at = %config.at, "Overdue sweep job started");

    loop {
        let now = Utc::now();
        let wake = next_run(now, config.at);
        let wait = (wake - now).to_std().unwrap_or(Duration::ZERO);
        tracing::debug!(next_run = %wake, "Overdue sweep scheduled");

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Overdue sweep job stopping");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                run_once(&projects, &tasks).await;
            }
        }
    }
}

/// Run both sweeps once, concurrently.
///
/// Each sweep logs its own report; only a sweep that could not run at all is
/// logged here.
pub async fn run_once<S: Store>(projects: &ProjectLifecycle<S>, tasks: &TaskLifecycle<S>) {
    let (project_result, task_result) =
        tokio::join!(projects.sweep_overdue(), tasks.sweep_overdue());
    if let Err(e) = project_result {
        tracing::error!(kind = "project", error = %e, "Overdue sweep failed");
    }
    if let Err(e) = task_result {
        tracing::error!(kind = "task", error = %e, "Overdue sweep failed");
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 8, 30, 0).unwrap();
        assert_eq!(
            next_run(now, at(9, 0)),
            Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_run_rolls_to_tomorrow_once_passed() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 8, 30, 0).unwrap();
        assert_eq!(
            next_run(now, at(0, 0)),
            Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_run_exactly_at_time_waits_a_full_day() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(
            next_run(now, at(0, 0)),
            Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn config_parses_time_of_day() {
        let lookup = |k: &str| match k {
            "OVERDUE_SWEEP_AT" => Some("02:15".to_string()),
            "OVERDUE_SWEEP_ENABLED" => Some("false".to_string()),
            _ => None,
        };
        let config = SweepConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.at, at(2, 15));
        assert!(!config.enabled);
    }

    #[test]
    fn config_rejects_malformed_time() {
        let lookup = |k: &str| (k == "OVERDUE_SWEEP_AT").then(|| "25:99".to_string());
        let err = SweepConfig::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "OVERDUE_SWEEP_AT", .. }));
    }

    #[test]
    fn config_defaults_to_enabled_at_midnight() {
        let config = SweepConfig::from_lookup(&|_: &str| None).unwrap();
        assert_eq!(config, SweepConfig::default());
    }
}
