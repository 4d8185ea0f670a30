use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

// ---------------------------------------------------------------------------
// PickupEvent – one row of the source table
// ---------------------------------------------------------------------------

/// A single observed pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupEvent {
    /// Combined date + time of the pickup.
    pub timestamp: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
    /// Dispatching base code, if the source carries one.
    pub base: Option<String>,
}

impl PickupEvent {
    pub fn new(timestamp: NaiveDateTime, lat: f64, lon: f64) -> Self {
        Self {
            timestamp,
            lat,
            lon,
            base: None,
        }
    }

    /// Calendar date component.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Hour-of-day component, 0..=23.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

// ---------------------------------------------------------------------------
// PickupDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with a pre-computed date index.
#[derive(Debug, Clone, Default)]
pub struct PickupDataset {
    /// All events in source order.
    pub events: Vec<PickupEvent>,
    /// Sorted set of distinct dates present in `events`.
    pub available_dates: BTreeSet<NaiveDate>,
}

impl PickupDataset {
    /// Build the date index from the loaded events.
    pub fn from_events(events: Vec<PickupEvent>) -> Self {
        let available_dates = events.iter().map(PickupEvent::date).collect();
        PickupDataset {
            events,
            available_dates,
        }
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.available_dates.first().copied()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.available_dates.last().copied()
    }

    /// Clamp `date` into the observed date range. Returns `date` unchanged
    /// for an empty dataset.
    pub fn clamp_date(&self, date: NaiveDate) -> NaiveDate {
        match (self.min_date(), self.max_date()) {
            (Some(lo), Some(hi)) => date.clamp(lo, hi),
            _ => date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> PickupEvent {
        let ts = NaiveDate::from_ymd_opt(2014, 9, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        PickupEvent::new(ts, 40.7, -74.0)
    }

    #[test]
    fn date_index_is_sorted_and_distinct() {
        let ds = PickupDataset::from_events(vec![at(3, 1), at(1, 2), at(3, 4)]);
        let dates: Vec<_> = ds.available_dates.iter().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2014-09-01", "2014-09-03"]);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn clamp_date_keeps_dates_in_range() {
        let ds = PickupDataset::from_events(vec![at(2, 0), at(5, 0)]);
        let early = NaiveDate::from_ymd_opt(2014, 8, 30).unwrap();
        let late = NaiveDate::from_ymd_opt(2014, 9, 30).unwrap();
        let inside = NaiveDate::from_ymd_opt(2014, 9, 4).unwrap();
        assert_eq!(ds.clamp_date(early), ds.min_date().unwrap());
        assert_eq!(ds.clamp_date(late), ds.max_date().unwrap());
        assert_eq!(ds.clamp_date(inside), inside);
    }

    #[test]
    fn empty_dataset_has_no_range() {
        let ds = PickupDataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.min_date(), None);
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(ds.clamp_date(d), d);
    }
}
