//! Derived statistics
//!
//! Every report is a pure function of a corpus snapshot, recomputed in full
//! on each run - no incremental state to keep consistent.

mod describe;
mod frequency;

pub use describe::{CronDescriber, TerseDescriber, VerboseDescriber, day_of_week_report, description_report};
pub use frequency::{
    FrequencyReport, convert_to_frequency, frequency_report, next_interval_seconds, normalize_expression,
    parse_schedule,
};

use indexmap::IndexMap;

use crate::corpus::Corpus;

/// All derived artifacts for one corpus snapshot
#[derive(Debug)]
pub struct Reports {
    pub frequencies: FrequencyReport,
    pub descriptions: IndexMap<String, u64>,
    pub times: IndexMap<String, u64>,
    pub day_of_week: IndexMap<String, u64>,
}

/// Compute every report with the default describer pair
pub fn aggregate(corpus: &Corpus) -> Reports {
    let frequencies = frequency_report(corpus);
    let (descriptions, times) = description_report(corpus, &TerseDescriber, &VerboseDescriber);
    let day_of_week = day_of_week_report(&descriptions);
    Reports {
        frequencies,
        descriptions,
        times,
        day_of_week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ScheduleEntry;

    #[test]
    fn test_aggregate_midnight_daily_scenario() {
        let mut corpus = Corpus::default();
        corpus.record("org/repo", "file.yml", vec![ScheduleEntry::new("0 0 * * *")]);

        let reports = aggregate(&corpus);
        assert_eq!(reports.frequencies.by_freq.get("1 days"), Some(&1));
        assert_eq!(reports.times.get("00:00"), Some(&1));
        assert_eq!(reports.day_of_week.get("every day"), Some(&1));
    }
}
