use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::cache::DatasetCache;
use crate::data::filter::{FilterOutcome, TimeMode, TimeSelection, evaluate, filter_by_hour};
use crate::data::loader::DataSource;
use crate::data::model::PickupDataset;
use crate::data::stats::{hour_counts, hour_histogram};
use crate::hexbin::HexLayer;
use crate::interaction::InteractionState;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the current dataset was (or will be) loaded from.
    pub source: DataSource,
    /// Row limit passed to the loader.
    pub max_rows: usize,
    pub cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<PickupDataset>>,

    /// Pickups per hour over the whole dataset.
    pub histogram: [u64; 24],
    /// Non-empty hours with their counts, ascending.
    pub hour_counts: Vec<(u32, u64)>,

    pub show_raw: bool,

    /// Hour shown on the all-dates point map.
    pub map_hour: u32,
    /// Indices of events at `map_hour` (cached).
    pub map_hour_indices: Vec<usize>,

    // ---- time selection widgets ----
    pub selected_date: NaiveDate,
    pub time_mode: TimeMode,
    pub single_hour: u32,
    pub range_start: u32,
    pub range_end: u32,

    /// Result of the current selection (cached).
    pub outcome: Option<FilterOutcome>,
    last_selection: Option<TimeSelection>,
    last_map_hour: Option<u32>,

    pub interaction: InteractionState,
    pub hex_layer: HexLayer,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: DataSource, max_rows: usize) -> Self {
        Self {
            source,
            max_rows,
            cache: DatasetCache::new(),
            dataset: None,
            histogram: [0; 24],
            hour_counts: Vec::new(),
            show_raw: false,
            map_hour: 17,
            map_hour_indices: Vec::new(),
            selected_date: NaiveDate::default(),
            time_mode: TimeMode::AnyTime,
            single_hour: 0,
            range_start: 8,
            range_end: 11,
            outcome: None,
            last_selection: None,
            last_map_hour: None,
            interaction: InteractionState::default(),
            hex_layer: HexLayer::default(),
            status_message: None,
        }
    }

    /// Load `source` through the cache and make it current. On failure the
    /// previous dataset stays and the error is shown.
    pub fn load(&mut self, source: DataSource) {
        match self.cache.get_or_load(&source, self.max_rows) {
            Ok(dataset) => {
                self.source = source;
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {source}: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Drop the cached copy of the current source and load it again.
    pub fn reload(&mut self) {
        let source = self.source.clone();
        self.cache.invalidate(&source);
        self.load(source);
    }

    /// Ingest a newly loaded dataset, recompute derived views and reset the
    /// date to the first available one.
    pub fn set_dataset(&mut self, dataset: Arc<PickupDataset>) {
        self.histogram = hour_histogram(&dataset);
        self.hour_counts = hour_counts(&dataset);
        if let Some(first) = dataset.min_date() {
            self.selected_date = first;
        }

        self.dataset = Some(dataset);
        self.last_selection = None;
        self.last_map_hour = None;
        self.status_message = None;
        self.refresh();
    }

    /// The selection described by the current widget values.
    pub fn selection(&self) -> TimeSelection {
        let date = self.selected_date;
        match self.time_mode {
            TimeMode::AnyTime => TimeSelection::AnyTime { date },
            TimeMode::SingleHour => TimeSelection::SingleHour {
                date,
                hour: self.single_hour,
            },
            TimeMode::HourRange => TimeSelection::HourRange {
                date,
                start_hour: self.range_start,
                end_hour: self.range_end,
            },
        }
    }

    /// Move the range start; the end follows if it would fall behind.
    pub fn set_range_start(&mut self, hour: u32) {
        self.range_start = hour.min(23);
        self.range_end = self.range_end.max(self.range_start);
    }

    /// Move the range end; the start follows if it would get ahead.
    pub fn set_range_end(&mut self, hour: u32) {
        self.range_end = hour.min(23);
        self.range_start = self.range_start.min(self.range_end);
    }

    /// Once per frame: count mode changes and re-evaluate whatever changed.
    pub fn refresh(&mut self) {
        self.interaction = self.interaction.record_mode_change(self.time_mode);

        let Some(dataset) = &self.dataset else {
            return;
        };

        self.selected_date = dataset.clamp_date(self.selected_date);

        let selection = self.selection();
        if self.last_selection != Some(selection) {
            let outcome = evaluate(dataset, &selection);
            log::debug!(
                "{} / {}: {} of {} pickups",
                selection.date(),
                selection.mode(),
                outcome.len(),
                dataset.len()
            );
            self.outcome = Some(outcome);
            self.last_selection = Some(selection);
        }

        if self.last_map_hour != Some(self.map_hour) {
            self.map_hour_indices = filter_by_hour(dataset, self.map_hour);
            self.last_map_hour = Some(self.map_hour);
        }
    }
}
