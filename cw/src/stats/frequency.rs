//! Inter-run interval statistics
//!
//! Buckets every schedule by the delta between its next two fire times and
//! renders the bucket keys as human-readable cadence phrases. Thousands of
//! raw expressions reduce to a couple dozen cadences.

use chrono::Utc;
use cron::Schedule;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

use crate::corpus::Corpus;

const WEEK_SECS: i64 = 7 * 24 * 60 * 60;
const DAY_SECS: i64 = 24 * 60 * 60;
const HOUR_SECS: i64 = 60 * 60;
const MINUTE_SECS: i64 = 60;

/// Interval frequency distribution in two orderings
#[derive(Debug, Default, Serialize)]
pub struct FrequencyReport {
    /// Phrase -> count, ordered by raw interval seconds descending
    pub by_freq: IndexMap<String, u64>,
    /// Phrase -> count, ordered by occurrence count descending
    pub by_count: IndexMap<String, u64>,
}

/// Replace the "don't care" token with the general wildcard
///
/// Workflow authors write `?` in day fields; the iteration library only
/// accepts `*`, and the two are equivalent for firing purposes.
pub fn normalize_expression(expression: &str) -> String {
    expression
        .split_whitespace()
        .map(|field| if field == "?" { "*" } else { field })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a five-field expression into an iterable schedule
///
/// The iteration library wants a seconds field and addresses weekdays by
/// name, so numeric day-of-week tokens (0-7, both 0 and 7 meaning Sunday)
/// are translated before handing the expression over.
pub fn parse_schedule(expression: &str) -> Option<Schedule> {
    let normalized = normalize_expression(expression);
    let fields: Vec<&str> = normalized.split_whitespace().collect();
    let &[minute, hour, dom, month, dow] = fields.as_slice() else {
        return None;
    };
    let dow = translate_dow(dow)?;
    Schedule::from_str(&format!("0 {} {} {} {} {}", minute, hour, dom, month, dow)).ok()
}

/// Rewrite numeric day-of-week tokens as weekday names
fn translate_dow(field: &str) -> Option<String> {
    const NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
    let token = |t: &str| -> Option<String> {
        match t.parse::<u8>() {
            Ok(n) if n <= 7 => Some(NAMES[(n % 7) as usize].to_string()),
            Ok(_) => None,
            Err(_) => Some(t.to_string()),
        }
    };
    let mut parts = Vec::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (part, None),
        };
        let range = match range.split_once('-') {
            Some((lo, hi)) => format!("{}-{}", token(lo)?, token(hi)?),
            None => token(range)?,
        };
        match step {
            Some(step) => parts.push(format!("{}/{}", range, step)),
            None => parts.push(range),
        }
    }
    Some(parts.join(","))
}

/// Seconds between the first two upcoming fire times, starting now
pub fn next_interval_seconds(expression: &str) -> Option<i64> {
    let schedule = parse_schedule(expression)?;
    let mut fires = schedule.upcoming(Utc);
    let first = fires.next()?;
    let second = fires.next()?;
    Some((second - first).num_seconds())
}

/// Render an interval as a composed weeks/days/hours/minutes phrase
///
/// Zero-valued components are omitted: 90000 seconds -> "1 days 1 hours".
pub fn convert_to_frequency(seconds: i64) -> String {
    let mut remainder = seconds;
    let weeks = remainder / WEEK_SECS;
    remainder %= WEEK_SECS;
    let days = remainder / DAY_SECS;
    remainder %= DAY_SECS;
    let hours = remainder / HOUR_SECS;
    remainder %= HOUR_SECS;
    let minutes = remainder / MINUTE_SECS;

    let mut parts = Vec::new();
    for (value, unit) in [(weeks, "weeks"), (days, "days"), (hours, "hours"), (minutes, "minutes")] {
        if value > 0 {
            parts.push(format!("{} {}", value, unit));
        }
    }
    if parts.is_empty() {
        return format!("{} seconds", seconds);
    }
    parts.join(" ")
}

/// Bucket every corpus entry by its inter-run interval
pub fn frequency_report(corpus: &Corpus) -> FrequencyReport {
    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for entry in corpus.entries() {
        let Some(expression) = entry.cron.as_deref() else {
            continue;
        };
        match next_interval_seconds(expression) {
            Some(seconds) => *buckets.entry(seconds).or_default() += 1,
            None => debug!(expression, "frequency_report: skipping malformed expression"),
        }
    }

    let mut report = FrequencyReport::default();
    for (&seconds, &count) in buckets.iter().rev() {
        *report.by_freq.entry(convert_to_frequency(seconds)).or_insert(0) += count;
    }

    let mut pairs: Vec<(String, u64)> = report.by_freq.iter().map(|(k, &v)| (k.clone(), v)).collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));
    for (phrase, count) in pairs {
        report.by_count.insert(phrase, count);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ScheduleEntry;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_replaces_dont_care_token() {
        assert_eq!(normalize_expression("0 0 ? * *"), "0 0 * * *");
        assert_eq!(normalize_expression("0 0 * * ?"), "0 0 * * *");
        // Only whole tokens are rewritten
        assert_eq!(normalize_expression("*/15 2-4 * * 1"), "*/15 2-4 * * 1");
    }

    #[test]
    fn test_daily_interval_is_one_day() {
        assert_eq!(next_interval_seconds("0 0 * * *"), Some(DAY_SECS));
    }

    #[test]
    fn test_hourly_and_weekly_intervals() {
        assert_eq!(next_interval_seconds("0 * * * *"), Some(HOUR_SECS));
        assert_eq!(next_interval_seconds("0 9 * * 3"), Some(WEEK_SECS));
    }

    #[test]
    fn test_numeric_dow_accepted() {
        // 0 and 7 both mean Sunday; either way the cadence is weekly
        assert_eq!(next_interval_seconds("0 6 * * 0"), Some(WEEK_SECS));
        assert_eq!(next_interval_seconds("0 6 * * 7"), Some(WEEK_SECS));
        assert!(next_interval_seconds("0 6 * * 1-5").is_some());
    }

    #[test]
    fn test_normalization_preserves_interval() {
        assert_eq!(next_interval_seconds("0 12 * * ?"), next_interval_seconds("0 12 * * *"));
        assert_eq!(next_interval_seconds("30 3 ? * ?"), next_interval_seconds("30 3 * * *"));
    }

    #[test]
    fn test_malformed_expressions_rejected() {
        assert_eq!(next_interval_seconds("not a cron"), None);
        assert_eq!(next_interval_seconds("0 0 * *"), None);
        assert_eq!(next_interval_seconds("0 25 * * *"), None);
        assert_eq!(next_interval_seconds("0 0 * * 9"), None);
    }

    #[test]
    fn test_convert_to_frequency_phrases() {
        assert_eq!(convert_to_frequency(DAY_SECS), "1 days");
        assert_eq!(convert_to_frequency(WEEK_SECS), "1 weeks");
        assert_eq!(convert_to_frequency(90_000), "1 days 1 hours");
        assert_eq!(convert_to_frequency(15 * MINUTE_SECS), "15 minutes");
        assert_eq!(convert_to_frequency(0), "0 seconds");
    }

    #[test]
    fn test_frequency_report_orderings() {
        let mut corpus = Corpus::default();
        corpus.record(
            "org/repo",
            "a.yml",
            vec![
                ScheduleEntry::new("0 0 * * *"),
                ScheduleEntry::new("0 1 * * *"),
                ScheduleEntry::new("0 9 * * 1"),
                ScheduleEntry::new("bogus"),
            ],
        );

        let report = frequency_report(&corpus);
        // by_freq: longest interval first
        let freq_keys: Vec<&String> = report.by_freq.keys().collect();
        assert_eq!(freq_keys, vec!["1 weeks", "1 days"]);
        // by_count: most common first
        let count_keys: Vec<&String> = report.by_count.keys().collect();
        assert_eq!(count_keys, vec!["1 days", "1 weeks"]);
        assert_eq!(report.by_count["1 days"], 2);
        assert_eq!(report.by_count["1 weeks"], 1);
    }

    /// Re-parse a frequency phrase back into component counts
    fn parse_frequency(phrase: &str) -> Vec<(i64, String)> {
        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        tokens
            .chunks(2)
            .map(|pair| (pair[0].parse().unwrap(), pair[1].to_string()))
            .collect()
    }

    proptest! {
        /// For whole weeks/days/hours/minutes durations, the rendered phrase
        /// reconstructs the original components, zeros omitted.
        #[test]
        fn prop_convert_to_frequency_round_trip(
            weeks in 0i64..5,
            days in 0i64..7,
            hours in 0i64..24,
            minutes in 0i64..60,
        ) {
            prop_assume!(weeks + days + hours + minutes > 0);
            let seconds = weeks * WEEK_SECS + days * DAY_SECS + hours * HOUR_SECS + minutes * MINUTE_SECS;
            let phrase = convert_to_frequency(seconds);

            let mut expected = Vec::new();
            for (value, unit) in [(weeks, "weeks"), (days, "days"), (hours, "hours"), (minutes, "minutes")] {
                if value > 0 {
                    expected.push((value, unit.to_string()));
                }
            }
            prop_assert_eq!(parse_frequency(&phrase), expected);
        }
    }
}
