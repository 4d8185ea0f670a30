use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Density colour ramp
// ---------------------------------------------------------------------------

/// Yellow → dark red, the usual sequential ramp for hexagon density.
const DENSITY_STOPS: [(u8, u8, u8); 6] = [
    (255, 255, 178),
    (254, 217, 118),
    (254, 178, 76),
    (253, 141, 60),
    (240, 59, 32),
    (189, 0, 38),
];

/// Maps a normalised value in `[0, 1]` to a colour by interpolating a list
/// of stops in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<LinSrgb>,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::new(&DENSITY_STOPS)
    }
}

impl ColorRamp {
    pub fn new(stops: &[(u8, u8, u8)]) -> Self {
        let stops = stops
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
            .collect();
        ColorRamp { stops }
    }

    /// Colour for `t`; values outside `[0, 1]` are clamped.
    pub fn color_at(&self, t: f32) -> Color32 {
        let Some(last) = self.stops.len().checked_sub(1) else {
            return Color32::GRAY;
        };
        let pos = t.clamp(0.0, 1.0) * last as f32;
        let i = (pos.floor() as usize).min(last);
        let j = (i + 1).min(last);
        let mixed = self.stops[i].mix(self.stops[j], pos - i as f32);
        to_color32(Srgb::from_linear(mixed))
    }

    /// Same as [`color_at`](Self::color_at) with the given alpha.
    pub fn color_with_opacity(&self, t: f32, opacity: f32) -> Color32 {
        let c = self.color_at(t);
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), a)
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

/// Darken a colour for shaded hexagon side faces.
pub fn shade(c: Color32, factor: f32) -> Color32 {
    let f = factor.clamp(0.0, 1.0);
    Color32::from_rgba_premultiplied(
        (c.r() as f32 * f) as u8,
        (c.g() as f32 * f) as u8,
        (c.b() as f32 * f) as u8,
        c.a(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_ends_hit_the_stops() {
        let ramp = ColorRamp::default();
        assert_eq!(ramp.color_at(0.0), Color32::from_rgb(255, 255, 178));
        assert_eq!(ramp.color_at(1.0), Color32::from_rgb(189, 0, 38));
        assert_eq!(ramp.color_at(-3.0), ramp.color_at(0.0));
        assert_eq!(ramp.color_at(7.0), ramp.color_at(1.0));
    }

    #[test]
    fn empty_ramp_is_gray() {
        assert_eq!(ColorRamp::new(&[]).color_at(0.5), Color32::GRAY);
    }

    #[test]
    fn opacity_sets_alpha() {
        let c = ColorRamp::default().color_with_opacity(1.0, 0.5);
        assert_eq!(c.a(), 128);
    }
}
