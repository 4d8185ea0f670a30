use std::fmt;

use chrono::NaiveDate;

use super::model::{PickupDataset, PickupEvent};
use super::stats::{Centroid, centroid};

// ---------------------------------------------------------------------------
// Time selection: which slice of the day is active
// ---------------------------------------------------------------------------

/// The three mutually exclusive ways of picking a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeMode {
    #[default]
    AnyTime,
    SingleHour,
    HourRange,
}

impl TimeMode {
    pub const ALL: [TimeMode; 3] = [TimeMode::AnyTime, TimeMode::SingleHour, TimeMode::HourRange];

    /// Label shown next to the radio button.
    pub fn label(self) -> &'static str {
        match self {
            TimeMode::AnyTime => "Any time period",
            TimeMode::SingleHour => "A single time period",
            TimeMode::HourRange => "Time periods",
        }
    }
}

impl fmt::Display for TimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully specified filter: a date plus a mode with its parameters.
///
/// Hours are expected in `0..=23` and `start_hour <= end_hour`; the widgets
/// producing these values enforce that, [`evaluate`] does not re-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSelection {
    AnyTime {
        date: NaiveDate,
    },
    SingleHour {
        date: NaiveDate,
        hour: u32,
    },
    HourRange {
        date: NaiveDate,
        start_hour: u32,
        end_hour: u32,
    },
}

impl TimeSelection {
    pub fn mode(&self) -> TimeMode {
        match self {
            TimeSelection::AnyTime { .. } => TimeMode::AnyTime,
            TimeSelection::SingleHour { .. } => TimeMode::SingleHour,
            TimeSelection::HourRange { .. } => TimeMode::HourRange,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match *self {
            TimeSelection::AnyTime { date }
            | TimeSelection::SingleHour { date, .. }
            | TimeSelection::HourRange { date, .. } => date,
        }
    }

    /// Human-readable description of the active time window.
    pub fn describe(&self) -> String {
        match *self {
            TimeSelection::AnyTime { .. } => TimeMode::AnyTime.label().to_string(),
            TimeSelection::SingleHour { hour, .. } => format_hour(hour),
            TimeSelection::HourRange {
                start_hour,
                end_hour,
                ..
            } => format!("{} - {}", format_hour(start_hour), format_hour(end_hour)),
        }
    }

    /// Whether `event` falls inside this selection.
    pub fn matches(&self, event: &PickupEvent) -> bool {
        if event.date() != self.date() {
            return false;
        }
        match *self {
            TimeSelection::AnyTime { .. } => true,
            TimeSelection::SingleHour { hour, .. } => event.hour() == hour,
            TimeSelection::HourRange {
                start_hour,
                end_hour,
                ..
            } => (start_hour..=end_hour).contains(&event.hour()),
        }
    }
}

/// `7` → `"07:00"`.
pub fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Result of applying a [`TimeSelection`] to a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Indices into `dataset.events` of matching events, in source order.
    pub indices: Vec<usize>,
    /// Description of the active time window.
    pub description: String,
    /// Mean position of the matching events (fallback when empty).
    pub centroid: Centroid,
}

impl FilterOutcome {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate the matching events.
    pub fn events<'a>(&'a self, dataset: &'a PickupDataset) -> impl Iterator<Item = &'a PickupEvent> + 'a {
        self.indices.iter().map(move |&i| &dataset.events[i])
    }

    /// Status line shown above the 3D map.
    pub fn summary(&self, date: NaiveDate) -> String {
        format!("data {} date {} time: {}", self.len(), date, self.description)
    }
}

/// Filter `dataset` by `selection`. No match is an empty outcome, not an error.
pub fn evaluate(dataset: &PickupDataset, selection: &TimeSelection) -> FilterOutcome {
    let indices = matching_indices(dataset, |ev| selection.matches(ev));
    let centroid = centroid(indices.iter().map(|&i| &dataset.events[i]));
    FilterOutcome {
        indices,
        description: selection.describe(),
        centroid,
    }
}

/// Indices of events at `hour` on any date.
pub fn filter_by_hour(dataset: &PickupDataset, hour: u32) -> Vec<usize> {
    matching_indices(dataset, |ev| ev.hour() == hour)
}

fn matching_indices<F>(dataset: &PickupDataset, pred: F) -> Vec<usize>
where
    F: Fn(&PickupEvent) -> bool,
{
    dataset
        .events
        .iter()
        .enumerate()
        .filter(|(_, ev)| pred(ev))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::FALLBACK_CENTROID;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 9, d).unwrap()
    }

    fn ev(d: u32, hour: u32, minute: u32) -> PickupEvent {
        let ts = day(d).and_hms_opt(hour, minute, 0).unwrap();
        PickupEvent::new(ts, 40.7 + hour as f64 * 0.001, -74.0)
    }

    fn hours_of(outcome: &FilterOutcome, ds: &PickupDataset) -> Vec<u32> {
        outcome.events(ds).map(|e| e.hour()).collect()
    }

    fn mixed_dataset() -> PickupDataset {
        let mut events = Vec::new();
        for d in [1, 2, 3] {
            for h in [0, 5, 8, 9, 11, 12, 17, 23] {
                events.push(ev(d, h, 7));
                events.push(ev(d, h, 42));
            }
        }
        PickupDataset::from_events(events)
    }

    #[test]
    fn single_hour_scenario() {
        let ds = PickupDataset::from_events(vec![ev(1, 5, 0), ev(1, 5, 30), ev(1, 17, 0)]);
        let out = evaluate(&ds, &TimeSelection::SingleHour { date: day(1), hour: 5 });
        assert_eq!(out.indices, vec![0, 1]);
        assert_eq!(out.description, "05:00");
    }

    #[test]
    fn hour_range_scenario() {
        let ds = PickupDataset::from_events(
            [7, 8, 9, 11, 12].iter().map(|&h| ev(1, h, 0)).collect(),
        );
        let sel = TimeSelection::HourRange {
            date: day(1),
            start_hour: 8,
            end_hour: 11,
        };
        let out = evaluate(&ds, &sel);
        assert_eq!(hours_of(&out, &ds), vec![8, 9, 11]);
        assert_eq!(out.description, "08:00 - 11:00");
    }

    #[test]
    fn any_time_returns_exactly_the_date() {
        let ds = mixed_dataset();
        let out = evaluate(&ds, &TimeSelection::AnyTime { date: day(2) });
        let expected: Vec<usize> = ds
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.date() == day(2))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(out.indices, expected);
        assert_eq!(out.description, "Any time period");
    }

    #[test]
    fn single_hour_is_subset_of_any_time() {
        let ds = mixed_dataset();
        let whole_day = evaluate(&ds, &TimeSelection::AnyTime { date: day(3) });
        for h in 0..24 {
            let out = evaluate(&ds, &TimeSelection::SingleHour { date: day(3), hour: h });
            assert!(out.indices.iter().all(|i| whole_day.indices.contains(i)));
            assert!(out.events(&ds).all(|e| e.hour() == h));
        }
    }

    #[test]
    fn hour_range_is_union_of_single_hours() {
        let ds = mixed_dataset();
        for (s, e) in [(0, 23), (8, 11), (12, 12), (13, 16)] {
            let range = evaluate(
                &ds,
                &TimeSelection::HourRange {
                    date: day(1),
                    start_hour: s,
                    end_hour: e,
                },
            );
            let mut union: Vec<usize> = (s..=e)
                .flat_map(|h| evaluate(&ds, &TimeSelection::SingleHour { date: day(1), hour: h }).indices)
                .collect();
            union.sort_unstable();
            assert_eq!(range.indices, union, "range {s}..={e}");
        }
    }

    #[test]
    fn no_match_is_empty_with_fallback_centroid() {
        let ds = mixed_dataset();
        let out = evaluate(&ds, &TimeSelection::SingleHour { date: day(1), hour: 3 });
        assert!(out.is_empty());
        assert_eq!(out.centroid, FALLBACK_CENTROID);

        let out = evaluate(&ds, &TimeSelection::AnyTime { date: day(20) });
        assert!(out.is_empty());
        assert_eq!(out.centroid, FALLBACK_CENTROID);
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let ds = mixed_dataset();
        let out = evaluate(
            &ds,
            &TimeSelection::HourRange {
                date: day(1),
                start_hour: 12,
                end_hour: 8,
            },
        );
        assert!(out.is_empty());
        assert_eq!(out.description, "12:00 - 08:00");
    }

    #[test]
    fn centroid_follows_filtered_events() {
        let ds = PickupDataset::from_events(vec![ev(1, 10, 0), ev(1, 20, 0), ev(2, 10, 0)]);
        let out = evaluate(&ds, &TimeSelection::AnyTime { date: day(1) });
        assert!((out.centroid.lat - 40.715).abs() < 1e-9);
        assert!((out.centroid.lon - -74.0).abs() < 1e-9);
    }

    #[test]
    fn filter_by_hour_spans_all_dates() {
        let ds = mixed_dataset();
        let idx = filter_by_hour(&ds, 17);
        assert_eq!(idx.len(), 6);
        assert!(idx.iter().all(|&i| ds.events[i].hour() == 17));
    }

    #[test]
    fn summary_line() {
        let ds = PickupDataset::from_events(vec![ev(1, 5, 0)]);
        let out = evaluate(&ds, &TimeSelection::SingleHour { date: day(1), hour: 5 });
        assert_eq!(out.summary(day(1)), "data 1 date 2014-09-01 time: 05:00");
    }

    #[test]
    fn selection_reports_its_mode() {
        let d = day(1);
        assert_eq!(TimeSelection::AnyTime { date: d }.mode(), TimeMode::AnyTime);
        assert_eq!(TimeSelection::SingleHour { date: d, hour: 1 }.mode(), TimeMode::SingleHour);
        assert_eq!(
            TimeSelection::HourRange { date: d, start_hour: 1, end_hour: 2 }.mode(),
            TimeMode::HourRange
        );
    }
}
