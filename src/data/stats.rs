use super::model::{PickupDataset, PickupEvent};

/// Map centre used when there is nothing to average (New York City).
pub const FALLBACK_CENTROID: Centroid = Centroid {
    lat: 40.7128,
    lon: -74.0060,
};

/// Arithmetic mean position of a set of events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

/// Mean latitude/longitude of `events`, or [`FALLBACK_CENTROID`] if empty.
pub fn centroid<'a, I>(events: I) -> Centroid
where
    I: IntoIterator<Item = &'a PickupEvent>,
{
    let (n, lat_sum, lon_sum) = events
        .into_iter()
        .fold((0usize, 0.0, 0.0), |(n, la, lo), ev| (n + 1, la + ev.lat, lo + ev.lon));

    if n == 0 {
        return FALLBACK_CENTROID;
    }
    Centroid {
        lat: lat_sum / n as f64,
        lon: lon_sum / n as f64,
    }
}

/// Pickups per hour of day over the whole dataset, one bucket per hour.
pub fn hour_histogram(dataset: &PickupDataset) -> [u64; 24] {
    let mut buckets = [0u64; 24];
    for ev in &dataset.events {
        // chrono guarantees 0..=23
        buckets[ev.hour() as usize] += 1;
    }
    buckets
}

/// `(hour, count)` for every hour that has at least one pickup, ascending.
pub fn hour_counts(dataset: &PickupDataset) -> Vec<(u32, u64)> {
    hour_histogram(dataset)
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(hour, &count)| (hour as u32, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ev(day: u32, hour: u32, lat: f64, lon: f64) -> PickupEvent {
        let ts = NaiveDate::from_ymd_opt(2014, 9, day)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap();
        PickupEvent::new(ts, lat, lon)
    }

    #[test]
    fn centroid_of_empty_set_is_new_york() {
        let none: Vec<PickupEvent> = Vec::new();
        let c = centroid(&none);
        assert_eq!(c.lat, 40.7128);
        assert_eq!(c.lon, -74.0060);
    }

    #[test]
    fn centroid_is_mean_position() {
        let events = vec![ev(1, 0, 40.0, -74.0), ev(1, 1, 41.0, -73.0)];
        let c = centroid(&events);
        assert!((c.lat - 40.5).abs() < 1e-12);
        assert!((c.lon - -73.5).abs() < 1e-12);
    }

    #[test]
    fn histogram_sums_to_dataset_length() {
        let ds = PickupDataset::from_events(vec![
            ev(1, 0, 40.7, -74.0),
            ev(1, 23, 40.7, -74.0),
            ev(2, 23, 40.7, -74.0),
            ev(3, 12, 40.7, -74.0),
        ]);
        let hist = hour_histogram(&ds);
        assert_eq!(hist.iter().sum::<u64>(), ds.len() as u64);
        assert_eq!(hist[23], 2);
        assert_eq!(hist[12], 1);
        assert_eq!(hist[0], 1);
    }

    #[test]
    fn hour_counts_skip_empty_hours_and_are_sorted() {
        let ds = PickupDataset::from_events(vec![
            ev(1, 17, 40.7, -74.0),
            ev(1, 5, 40.7, -74.0),
            ev(2, 5, 40.7, -74.0),
        ]);
        assert_eq!(hour_counts(&ds), vec![(5, 2), (17, 1)]);
    }

    #[test]
    fn stats_of_empty_dataset() {
        let ds = PickupDataset::default();
        assert_eq!(hour_histogram(&ds), [0; 24]);
        assert!(hour_counts(&ds).is_empty());
    }
}
