//! Natural-language schedule descriptions and the tallies built from them
//!
//! Two interchangeable renderers sit behind the [`CronDescriber`] seam: the
//! terse one is preferred for its short "At HH:MM ..." phrases but only
//! handles fixed-time schedules; the verbose one covers the rest. The
//! aggregator keeps the terse result only when it carries the expected "At"
//! prefix.

use indexmap::IndexMap;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::debug;

use crate::corpus::Corpus;
use crate::stats::frequency::{normalize_expression, parse_schedule};

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01][0-9]|2[0-3]):[0-5][0-9]\b").expect("valid time pattern"));

const WEEKDAYS: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Renders a cron expression as a descriptive phrase
pub trait CronDescriber {
    /// Describe a normalized five-field expression; `None` when this
    /// renderer cannot phrase it
    fn describe(&self, expression: &str) -> Option<String>;
}

/// The five fields of a standard cron expression
struct Fields<'a> {
    minute: &'a str,
    hour: &'a str,
    dom: &'a str,
    month: &'a str,
    dow: &'a str,
}

impl<'a> Fields<'a> {
    fn split(expression: &'a str) -> Option<Self> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        let &[minute, hour, dom, month, dow] = fields.as_slice() else {
            return None;
        };
        Some(Self {
            minute,
            hour,
            dom,
            month,
            dow,
        })
    }

    fn fixed_time(&self) -> Option<(u32, u32)> {
        let minute: u32 = self.minute.parse().ok()?;
        let hour: u32 = self.hour.parse().ok()?;
        (minute <= 59 && hour <= 23).then_some((hour, minute))
    }
}

/// Resolve a single day-of-week token (0-7 or a name) to its full name
fn weekday_name(token: &str) -> Option<&'static str> {
    if let Ok(n) = token.parse::<usize>() {
        return (n <= 7).then(|| WEEKDAYS[n % 7]);
    }
    let lowered = token.to_lowercase();
    WEEKDAYS
        .iter()
        .find(|name| {
            let name = name.to_lowercase();
            name == lowered || name[..3] == lowered
        })
        .copied()
}

/// Resolve a single month token (1-12 or a name) to its full name
fn month_name(token: &str) -> Option<&'static str> {
    if let Ok(n) = token.parse::<usize>() {
        return (1..=12).contains(&n).then(|| MONTHS[n - 1]);
    }
    let lowered = token.to_lowercase();
    MONTHS
        .iter()
        .find(|name| {
            let name = name.to_lowercase();
            name == lowered || name[..3] == lowered
        })
        .copied()
}

/// Primary renderer: short "At HH:MM every day" phrases
///
/// Handles fixed-time schedules in any month; anything with steps, ranges,
/// or lists is left to the fallback.
pub struct TerseDescriber;

impl CronDescriber for TerseDescriber {
    fn describe(&self, expression: &str) -> Option<String> {
        let fields = Fields::split(expression)?;
        let (hour, minute) = fields.fixed_time()?;
        if fields.month != "*" {
            return None;
        }

        let qualifier = match (fields.dom, fields.dow) {
            ("*", "*") => "every day".to_string(),
            ("*", dow) => format!("every {}", weekday_name(dow)?),
            (dom, "*") => {
                let day: u32 = dom.parse().ok()?;
                (1..=31).contains(&day).then(|| format!("on day {} of the month", day))?
            }
            (dom, dow) => {
                let day: u32 = dom.parse().ok()?;
                format!("on day {} of the month and every {}", day, weekday_name(dow)?)
            }
        };
        Some(format!("At {:02}:{:02} {}", hour, minute, qualifier))
    }
}

/// Fallback renderer: longer phrases covering steps, ranges, and lists
pub struct VerboseDescriber;

impl CronDescriber for VerboseDescriber {
    fn describe(&self, expression: &str) -> Option<String> {
        let fields = Fields::split(expression)?;
        let rendered = self
            .render(&fields)
            .unwrap_or_else(|| format!("On schedule {}", expression));
        Some(rendered)
    }
}

impl VerboseDescriber {
    fn render(&self, fields: &Fields<'_>) -> Option<String> {
        let mut phrase = if let Some((hour, minute)) = fields.fixed_time() {
            format!("At {:02}:{:02}", hour, minute)
        } else {
            match (fields.minute, fields.hour) {
                ("*", "*") => "Every minute".to_string(),
                (minute, "*") => {
                    if let Some(step) = minute.strip_prefix("*/") {
                        let step: u32 = step.parse().ok()?;
                        format!("Every {} minutes", step)
                    } else {
                        let minute: u32 = fields.minute.parse().ok()?;
                        format!("At {} minutes past every hour", minute)
                    }
                }
                (minute, hour) => {
                    let minute: u32 = minute.parse().ok()?;
                    let step = hour.strip_prefix("*/")?;
                    let step: u32 = step.parse().ok()?;
                    format!("At minute {} past every {} hours", minute, step)
                }
            }
        };

        if fields.dom != "*" {
            let day: u32 = fields.dom.parse().ok()?;
            phrase.push_str(&format!(", on day {} of the month", day));
        }
        if fields.month != "*" {
            phrase.push_str(&format!(", only in {}", self.month_list(fields.month)?));
        }
        if fields.dow != "*" {
            phrase.push_str(&format!(", only on {}", self.weekday_list(fields.dow)?));
        }
        Some(phrase)
    }

    fn weekday_list(&self, field: &str) -> Option<String> {
        self.token_list(field, weekday_name)
    }

    fn month_list(&self, field: &str) -> Option<String> {
        self.token_list(field, month_name)
    }

    fn token_list(&self, field: &str, resolve: fn(&str) -> Option<&'static str>) -> Option<String> {
        let mut names = Vec::new();
        for part in field.split(',') {
            match part.split_once('-') {
                Some((lo, hi)) => names.push(format!("{} through {}", resolve(lo)?, resolve(hi)?)),
                None => names.push(resolve(part)?.to_string()),
            }
        }
        Some(names.join(" and "))
    }
}

/// Tally descriptions and the "HH:MM" times embedded in them
///
/// Returns (description -> count, count descending; time -> count,
/// chronologically ascending). Entries without a parseable expression are
/// skipped.
pub fn description_report(
    corpus: &Corpus,
    primary: &dyn CronDescriber,
    fallback: &dyn CronDescriber,
) -> (IndexMap<String, u64>, IndexMap<String, u64>) {
    let mut descriptions: HashMap<String, u64> = HashMap::new();
    let mut times: BTreeMap<String, u64> = BTreeMap::new();

    for entry in corpus.entries() {
        let Some(expression) = entry.cron.as_deref() else {
            continue;
        };
        let normalized = normalize_expression(expression);
        if parse_schedule(&normalized).is_none() {
            debug!(expression, "description_report: skipping malformed expression");
            continue;
        }
        let description = match primary.describe(&normalized) {
            Some(terse) if terse.starts_with("At") => terse,
            _ => match fallback.describe(&normalized) {
                Some(verbose) => verbose,
                None => continue,
            },
        };

        if let Some(found) = TIME_RE.find(&description) {
            *times.entry(found.as_str().to_string()).or_default() += 1;
        }
        *descriptions.entry(description).or_default() += 1;
    }

    let mut pairs: Vec<(String, u64)> = descriptions.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    // Zero-padded HH:MM keys sort chronologically as strings
    (pairs.into_iter().collect(), times.into_iter().collect())
}

/// Tally "every day" / "every <Weekday>" labels across descriptions
///
/// Each matching label grows by the description's occurrence count. A
/// description containing both the generic and a specific substring counts
/// toward both labels; the vocabulary is small enough that this stays
/// unambiguous in practice.
pub fn day_of_week_report(descriptions: &IndexMap<String, u64>) -> IndexMap<String, u64> {
    let mut tally: HashMap<String, u64> = HashMap::new();
    for (description, &count) in descriptions {
        for token in ["day"].into_iter().chain(WEEKDAYS) {
            let label = format!("every {}", token);
            if description.contains(&label) {
                *tally.entry(label).or_default() += count;
            }
        }
    }

    let mut pairs: Vec<(String, u64)> = tally.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ScheduleEntry;

    #[test]
    fn test_terse_daily() {
        assert_eq!(
            TerseDescriber.describe("0 0 * * *").as_deref(),
            Some("At 00:00 every day")
        );
    }

    #[test]
    fn test_terse_weekday() {
        assert_eq!(
            TerseDescriber.describe("30 9 * * 1").as_deref(),
            Some("At 09:30 every Monday")
        );
        assert_eq!(
            TerseDescriber.describe("30 9 * * MON").as_deref(),
            Some("At 09:30 every Monday")
        );
        assert_eq!(
            TerseDescriber.describe("0 6 * * 0").as_deref(),
            Some("At 06:00 every Sunday")
        );
    }

    #[test]
    fn test_terse_day_of_month() {
        assert_eq!(
            TerseDescriber.describe("0 4 1 * *").as_deref(),
            Some("At 04:00 on day 1 of the month")
        );
    }

    #[test]
    fn test_terse_declines_complex_schedules() {
        assert!(TerseDescriber.describe("*/15 * * * *").is_none());
        assert!(TerseDescriber.describe("0 0 * 3 *").is_none());
        assert!(TerseDescriber.describe("0 0 * * 1-5").is_none());
    }

    #[test]
    fn test_verbose_steps() {
        assert_eq!(
            VerboseDescriber.describe("*/15 * * * *").as_deref(),
            Some("Every 15 minutes")
        );
        assert_eq!(
            VerboseDescriber.describe("0 * * * *").as_deref(),
            Some("At 0 minutes past every hour")
        );
        assert_eq!(
            VerboseDescriber.describe("30 */6 * * *").as_deref(),
            Some("At minute 30 past every 6 hours")
        );
    }

    #[test]
    fn test_verbose_qualifiers() {
        assert_eq!(
            VerboseDescriber.describe("0 0 * * 1-5").as_deref(),
            Some("At 00:00, only on Monday through Friday")
        );
        assert_eq!(
            VerboseDescriber.describe("0 12 1 3 *").as_deref(),
            Some("At 12:00, on day 1 of the month, only in March")
        );
    }

    #[test]
    fn test_verbose_always_produces_something() {
        // Valid for iteration but beyond both phrase vocabularies
        let description = VerboseDescriber.describe("1,31 4,16 * * *").unwrap();
        assert!(description.starts_with("On schedule"));
    }

    #[test]
    fn test_description_report_prefers_terse() {
        let mut corpus = Corpus::default();
        corpus.record("org/repo", "file.yml", vec![ScheduleEntry::new("0 0 * * *")]);

        let (descriptions, times) = description_report(&corpus, &TerseDescriber, &VerboseDescriber);
        assert_eq!(descriptions.get("At 00:00 every day"), Some(&1));
        assert_eq!(times.get("00:00"), Some(&1));
    }

    #[test]
    fn test_description_report_falls_back_when_no_at_prefix() {
        let mut corpus = Corpus::default();
        corpus.record("org/repo", "file.yml", vec![ScheduleEntry::new("*/15 * * * *")]);

        let (descriptions, times) = description_report(&corpus, &TerseDescriber, &VerboseDescriber);
        assert_eq!(descriptions.get("Every 15 minutes"), Some(&1));
        assert!(times.is_empty());
    }

    #[test]
    fn test_times_sorted_chronologically() {
        let mut corpus = Corpus::default();
        corpus.record(
            "org/repo",
            "file.yml",
            vec![
                ScheduleEntry::new("0 23 * * *"),
                ScheduleEntry::new("30 6 * * *"),
                ScheduleEntry::new("0 23 * * *"),
            ],
        );

        let (_, times) = description_report(&corpus, &TerseDescriber, &VerboseDescriber);
        let keys: Vec<&String> = times.keys().collect();
        assert_eq!(keys, vec!["06:30", "23:00"]);
        assert_eq!(times["23:00"], 2);
    }

    #[test]
    fn test_day_of_week_specific_label_only() {
        let mut descriptions = IndexMap::new();
        descriptions.insert("At 09:30 every Monday".to_string(), 3u64);

        let report = day_of_week_report(&descriptions);
        assert_eq!(report.get("every Monday"), Some(&3));
        assert!(!report.contains_key("every day"));
    }

    #[test]
    fn test_day_of_week_generic_label() {
        let mut descriptions = IndexMap::new();
        descriptions.insert("At 00:00 every day".to_string(), 2u64);

        let report = day_of_week_report(&descriptions);
        assert_eq!(report.get("every day"), Some(&2));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_day_of_week_permissive_double_match() {
        let mut descriptions = IndexMap::new();
        descriptions.insert("every day and every Friday".to_string(), 1u64);

        let report = day_of_week_report(&descriptions);
        assert_eq!(report.get("every day"), Some(&1));
        assert_eq!(report.get("every Friday"), Some(&1));
    }

    #[test]
    fn test_day_of_week_sorted_by_count() {
        let mut descriptions = IndexMap::new();
        descriptions.insert("At 01:00 every Monday".to_string(), 1u64);
        descriptions.insert("At 02:00 every day".to_string(), 5u64);

        let report = day_of_week_report(&descriptions);
        let keys: Vec<&String> = report.keys().collect();
        assert_eq!(keys, vec!["every day", "every Monday"]);
    }

    #[test]
    fn test_time_pattern_bounds() {
        assert!(TIME_RE.is_match("At 23:59 every day"));
        assert!(!TIME_RE.is_match("At 24:00"));
        assert!(!TIME_RE.is_match("ratio 3:2"));
    }
}
