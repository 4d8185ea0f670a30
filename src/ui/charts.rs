use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};

const CHART_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Hour-of-day charts
// ---------------------------------------------------------------------------

/// Bar chart of pickups per hour, one bar per bucket.
pub fn hour_histogram(ui: &mut Ui, histogram: &[u64; 24]) {
    let bars: Vec<Bar> = histogram
        .iter()
        .enumerate()
        .map(|(hour, &count)| Bar::new(hour as f64, count as f64).width(0.8))
        .collect();

    let chart = BarChart::new(bars)
        .name("Pickups")
        .color(Color32::from_rgb(0, 104, 201));

    Plot::new("hour_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Hour")
        .y_axis_label("Pickups")
        .allow_scroll(false)
        .allow_drag(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
        });
}

/// Scatter of pickups per hour for the non-empty hours.
pub fn hour_scatter(ui: &mut Ui, hour_counts: &[(u32, u64)]) {
    let points: PlotPoints = hour_counts
        .iter()
        .map(|&(hour, count)| [hour as f64, count as f64])
        .collect();

    ui.label("Uber Pickups by Hour");
    Plot::new("hour_scatter")
        .height(CHART_HEIGHT)
        .x_axis_label("Hour of Day")
        .y_axis_label("Number of Pickups")
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(points)
                    .name("Number of Pickups")
                    .radius(4.0)
                    .color(Color32::from_rgb(99, 110, 250)),
            );
        });
}
