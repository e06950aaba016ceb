//! Trigger expressions and the job/trigger pair handed to a scheduler.

use std::str::FromStr;
use std::time::Duration;

use croner::Cron;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("expression is empty")]
    Empty,

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("invalid cron expression: {0}")]
    InvalidCron(String),
}

/// When a job fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Six-field cron expression: `sec min hour day-of-month month day-of-week`.
    Cron(String),
    /// Fixed interval in whole seconds, written `@every <n><unit>` with unit
    /// `s`, `m`, `h` or `d`.
    Interval(Duration),
}

const INTERVAL_PREFIX: &str = "@every";
const CRON_FIELDS: usize = 6;

impl FromStr for Schedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.is_empty() {
            return Err(ScheduleError::Empty);
        }

        if let Some(rest) = expr.strip_prefix(INTERVAL_PREFIX) {
            return parse_interval(rest.trim()).map(Schedule::Interval);
        }

        let fields = expr.split_whitespace().count();
        if fields != CRON_FIELDS {
            return Err(ScheduleError::InvalidCron(format!(
                "expected {CRON_FIELDS} fields (sec min hour dom month dow), found {fields}"
            )));
        }

        // Same parser settings the engine applies when it builds the job.
        Cron::new(expr)
            .with_seconds_required()
            .with_dom_and_dow()
            .parse()
            .map_err(|e| ScheduleError::InvalidCron(e.to_string()))?;
        let normalized = expr.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(Schedule::Cron(normalized))
    }
}

fn parse_interval(raw: &str) -> Result<Duration, ScheduleError> {
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| ScheduleError::InvalidInterval(format!("'{raw}' has no unit")))?;
    let (digits, unit) = raw.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| ScheduleError::InvalidInterval(format!("'{raw}' has no amount")))?;
    if amount == 0 {
        return Err(ScheduleError::InvalidInterval(
            "interval must be greater than zero".to_string(),
        ));
    }

    // The engine repeats in whole seconds, so sub-second units are refused.
    let secs_per_unit = match unit.trim() {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        other => {
            return Err(ScheduleError::InvalidInterval(format!(
                "unknown unit '{other}'"
            )))
        }
    };

    amount
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| ScheduleError::InvalidInterval(format!("'{raw}' overflows")))
}

/// Identity of a registered job. Wraps the job's configured name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey(String);

impl JobKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What to run: the job's key plus the type the job factory resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDetail {
    pub key: JobKey,
    pub job_type: String,
}

/// When to run it. Keeps the source expression for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub key: JobKey,
    pub expression: String,
    pub schedule: Schedule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_field_cron() {
        let schedule: Schedule = "0 0 2 * * SUN".parse().expect("valid cron");
        assert_eq!(schedule, Schedule::Cron("0 0 2 * * SUN".to_string()));
    }

    #[test]
    fn normalizes_cron_whitespace() {
        let schedule: Schedule = "  0  */5 *  * * *".parse().expect("valid cron");
        assert_eq!(schedule, Schedule::Cron("0 */5 * * * *".to_string()));
    }

    #[test]
    fn rejects_five_field_cron() {
        let err = "*/5 * * * *".parse::<Schedule>().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidCron(ref m) if m.contains("found 5")));
    }

    #[test]
    fn rejects_out_of_range_cron_field() {
        let err = "0 0 25 * * *".parse::<Schedule>().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidCron(_)));
    }

    #[test]
    fn parses_intervals_in_each_unit() {
        let cases = [
            ("@every 30s", Duration::from_secs(30)),
            ("@every 5m", Duration::from_secs(300)),
            ("@every 2h", Duration::from_secs(7_200)),
            ("@every 1d", Duration::from_secs(86_400)),
        ];
        for (expr, expected) in cases {
            assert_eq!(
                expr.parse::<Schedule>(),
                Ok(Schedule::Interval(expected)),
                "{expr}"
            );
        }
    }

    #[test]
    fn weekday_zero_is_sunday() {
        let schedule: Schedule = "0 0 2 * * 0".parse().expect("sunday as 0");
        assert_eq!(schedule, Schedule::Cron("0 0 2 * * 0".to_string()));
    }

    #[test]
    fn accepts_last_day_of_month() {
        assert!("0 30 23 L * *".parse::<Schedule>().is_ok());
    }

    #[test]
    fn rejects_sub_second_intervals() {
        for expr in ["@every 250ms", "@every 1500ms"] {
            assert!(
                matches!(
                    expr.parse::<Schedule>(),
                    Err(ScheduleError::InvalidInterval(ref m)) if m.contains("unknown unit 'ms'")
                ),
                "{expr}"
            );
        }
    }

    #[test]
    fn rejects_zero_interval() {
        let err = "@every 0s".parse::<Schedule>().unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidInterval(ref m) if m.contains("zero")));
    }

    #[test]
    fn rejects_interval_without_unit_or_amount() {
        assert!(matches!(
            "@every 10".parse::<Schedule>(),
            Err(ScheduleError::InvalidInterval(_))
        ));
        assert!(matches!(
            "@every s".parse::<Schedule>(),
            Err(ScheduleError::InvalidInterval(_))
        ));
        assert!(matches!(
            "@every 3w".parse::<Schedule>(),
            Err(ScheduleError::InvalidInterval(_))
        ));
    }

    #[test]
    fn rejects_empty_expression() {
        assert_eq!("   ".parse::<Schedule>(), Err(ScheduleError::Empty));
    }
}
