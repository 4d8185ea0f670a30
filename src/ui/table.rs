use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::loader::{BASE_COLUMN, DATE_COLUMN, LAT_COLUMN, LON_COLUMN};
use crate::data::model::PickupDataset;

/// Scrollable table of every loaded row.
pub fn raw_table(ui: &mut Ui, dataset: &PickupDataset) {
    ui.push_id("raw_data", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(240.0)
            .column(Column::auto().at_least(150.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for name in [DATE_COLUMN, LAT_COLUMN, LON_COLUMN, BASE_COLUMN] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, dataset.len(), |mut row| {
                    let ev = &dataset.events[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(ev.timestamp.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.4}", ev.lat));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.4}", ev.lon));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(ev.base.as_deref().unwrap_or(""));
                    });
                });
            });
    });
}
