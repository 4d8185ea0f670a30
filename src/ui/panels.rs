use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::{TimeMode, format_hour};
use crate::data::loader::DataSource;
use crate::state::AppState;
use crate::ui::{charts, map, table};

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.checkbox(&mut state.show_raw, "Show raw data");
            ui.separator();

            // ---- Hour for the all-dates map ----
            ui.strong("hour");
            ui.add(hour_slider(&mut state.map_hour));
            ui.separator();

            // ---- Date ----
            ui.strong("Select date");
            ui.add(DatePickerButton::new(&mut state.selected_date).id_salt("selected_date"));
            if let (Some(first), Some(last)) = (dataset.min_date(), dataset.max_date()) {
                ui.small(format!("{first} – {last}"));
            }
            ui.separator();

            // ---- Time mode ----
            ui.strong("Select time");
            for mode in TimeMode::ALL {
                ui.radio_value(&mut state.time_mode, mode, mode.label());
            }
            ui.add_space(4.0);

            match state.time_mode {
                TimeMode::AnyTime => {}
                TimeMode::SingleHour => {
                    egui::ComboBox::from_label("Select a single time period")
                        .selected_text(format_hour(state.single_hour))
                        .show_ui(ui, |ui: &mut Ui| {
                            for hour in 0..24 {
                                ui.selectable_value(&mut state.single_hour, hour, format_hour(hour));
                            }
                        });
                }
                TimeMode::HourRange => {
                    ui.label("Time periods");
                    let mut start = state.range_start;
                    let mut end = state.range_end;
                    if ui.add(hour_slider(&mut start).text("from")).changed() {
                        state.set_range_start(start);
                    }
                    if ui.add(hour_slider(&mut end).text("to")).changed() {
                        state.set_range_end(end);
                    }
                }
            }
        });
}

/// `0..=23` slider labelled as `HH:00`.
fn hour_slider(hour: &mut u32) -> Slider<'_> {
    Slider::new(hour, 0..=23)
        .custom_formatter(|v, _| format_hour(v as u32))
        .custom_parser(|s| s.trim().trim_end_matches(":00").parse::<f64>().ok())
}

// ---------------------------------------------------------------------------
// Central panel – charts and maps
// ---------------------------------------------------------------------------

/// Render the dashboard body.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = state.dataset.as_deref() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data loaded  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new("Uber pickups in NYC").size(26.0));

            if state.show_raw {
                subheader(ui, "Raw data");
                table::raw_table(ui, dataset);
            }

            subheader(ui, "Number of pickups by hour");
            charts::hour_histogram(ui, &state.histogram);

            subheader(ui, &format!("Map of all pickups at {}", format_hour(state.map_hour)));
            map::point_map(ui, dataset, &state.map_hour_indices);

            subheader(ui, "Map of all pickups 3D");
            if let Some(outcome) = &state.outcome {
                ui.label(outcome.summary(state.selected_date));
                map::hex_map(ui, dataset, outcome, &state.hex_layer);
            }

            ui.add_space(8.0);
            ui.heading(format!("This page has run {} times.", state.interaction.count));

            subheader(ui, "Number of pickups by hour");
            charts::hour_scatter(ui, &state.hour_counts);
        });
}

fn subheader(ui: &mut Ui, text: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(text).strong().size(18.0));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.dataset {
            Some(ds) => ui.label(format!("{} pickups loaded from {}", ds.len(), state.source)),
            None => ui.label("Loading data..."),
        };

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open pickup data")
        .add_filter("Supported files", &["csv", "gz", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "gz"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load(DataSource::Path(path));
    }
}
