use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui};
use egui_plot::{Plot, PlotPoints, Points};

use crate::color::{ColorRamp, shade};
use crate::data::filter::FilterOutcome;
use crate::data::model::PickupDataset;
use crate::hexbin::{HexBin, HexLayer, MapView, bin_points};

const MAP_HEIGHT: f32 = 420.0;

// ---------------------------------------------------------------------------
// Flat point map
// ---------------------------------------------------------------------------

/// Plot every event in `indices` at its lon/lat.
pub fn point_map(ui: &mut Ui, dataset: &PickupDataset, indices: &[usize]) {
    let points: PlotPoints = indices
        .iter()
        .map(|&i| {
            let ev = &dataset.events[i];
            [ev.lon, ev.lat]
        })
        .collect();

    // Keep metres roughly square at New York's latitude.
    let aspect = 1.0 / 40.7_f32.to_radians().cos();

    Plot::new("hour_point_map")
        .height(MAP_HEIGHT)
        .data_aspect(aspect)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(points)
                    .radius(1.5)
                    .color(Color32::from_rgb(200, 30, 60)),
            );
        });
}

// ---------------------------------------------------------------------------
// Extruded hexagon map
// ---------------------------------------------------------------------------

/// Draw the filtered events as extruded hexagons seen from a tilted camera.
pub fn hex_map(ui: &mut Ui, dataset: &PickupDataset, outcome: &FilterOutcome, layer: &HexLayer) {
    let view = MapView::centered_on(outcome.centroid);
    let bins = bin_points(
        outcome.events(dataset).map(|ev| (ev.lat, ev.lon)),
        outcome.centroid,
        layer.radius_m,
    );

    let size = egui::vec2(ui.available_width(), MAP_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let painter = painter.with_clip_rect(rect);
    painter.rect_filled(rect, 4.0, Color32::from_gray(24));

    if bins.is_empty() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No pickups in this time window",
            FontId::proportional(14.0),
            Color32::GRAY,
        );
        return;
    }

    let mpp = view.metres_per_pixel();
    let pitch = view.pitch.to_radians();
    let (sin_p, cos_p) = (pitch.sin(), pitch.cos());
    let origin = rect.center();
    let to_screen = |x_m: f64, y_m: f64, z_m: f64| {
        Pos2::new(
            origin.x + (x_m / mpp) as f32,
            origin.y - ((y_m * cos_p + z_m * sin_p) / mpp) as f32,
        )
    };

    let (min, max) = bins
        .iter()
        .fold((u64::MAX, 0), |(lo, hi), b| (lo.min(b.count), hi.max(b.count)));
    let ramp = ColorRamp::default();
    let drawn_radius = layer.radius_m * layer.coverage;

    // bin_points orders north to south, i.e. back to front.
    for bin in &bins {
        let t = if max > min {
            (bin.count - min) as f32 / (max - min) as f32
        } else {
            1.0
        };
        let top_color = ramp.color_with_opacity(t, layer.opacity);
        let height = if layer.extruded {
            layer.elevation(bin.count, min, max)
        } else {
            0.0
        };

        let corners = hex_corners(bin, drawn_radius);
        let top: Vec<Pos2> = corners.iter().map(|&(x, y)| to_screen(x, y, height)).collect();

        if height > 0.0 {
            let base: Vec<Pos2> = corners.iter().map(|&(x, y)| to_screen(x, y, 0.0)).collect();
            let side = shade(top_color, 0.65);
            for i in 0..6 {
                let j = (i + 1) % 6;
                // Only faces pointing towards the camera (south) are visible.
                if (corners[i].1 + corners[j].1) / 2.0 < bin.y_m {
                    painter.add(Shape::convex_polygon(
                        vec![base[i], base[j], top[j], top[i]],
                        side,
                        Stroke::NONE,
                    ));
                }
            }
        }

        painter.add(Shape::convex_polygon(
            top,
            top_color,
            Stroke::new(0.5, Color32::from_black_alpha(60)),
        ));
    }

    painter.text(
        rect.left_top() + egui::vec2(8.0, 8.0),
        Align2::LEFT_TOP,
        format!(
            "{:.4}, {:.4}  zoom {}  pitch {}°  {} cells",
            view.lat,
            view.lon,
            view.zoom,
            view.pitch,
            bins.len()
        ),
        FontId::monospace(11.0),
        Color32::LIGHT_GRAY,
    );

    if !layer.pickable {
        return;
    }
    let hit_px = ((drawn_radius / mpp) as f32).max(4.0);
    let hovered = response.hover_pos().and_then(|pointer| {
        bins.iter()
            .map(|bin| {
                let height = layer.elevation(bin.count, min, max);
                (bin, to_screen(bin.x_m, bin.y_m, height).distance(pointer))
            })
            .filter(|&(_, d)| d <= hit_px)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(bin, _)| bin.count)
    });
    if let Some(count) = hovered {
        response.on_hover_text_at_pointer(format!("Number of Pickups: {count}"));
    }
}

/// Pointy-top hexagon corners in metres, starting at -30°.
fn hex_corners(bin: &HexBin, radius_m: f64) -> [(f64, f64); 6] {
    std::array::from_fn(|i| {
        let angle = (60.0 * i as f64 - 30.0).to_radians();
        (bin.x_m + radius_m * angle.cos(), bin.y_m + radius_m * angle.sin())
    })
}
