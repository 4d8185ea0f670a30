use std::collections::HashMap;

use crate::data::stats::Centroid;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

// ---------------------------------------------------------------------------
// Presentation parameters
// ---------------------------------------------------------------------------

/// Extruded hexagon layer settings, passed to the renderer unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct HexLayer {
    /// Hexagon circumradius in metres.
    pub radius_m: f64,
    pub elevation_scale: f64,
    /// Elevation (metres, before scaling) for the least and most dense bins.
    pub elevation_range: [f64; 2],
    /// Fraction of the cell the drawn hexagon covers.
    pub coverage: f64,
    pub opacity: f32,
    pub extruded: bool,
    pub pickable: bool,
}

impl Default for HexLayer {
    fn default() -> Self {
        Self {
            radius_m: 200.0,
            elevation_scale: 4.0,
            elevation_range: [0.0, 1000.0],
            coverage: 0.6,
            opacity: 0.5,
            extruded: true,
            pickable: true,
        }
    }
}

impl HexLayer {
    /// Scaled elevation for a bin holding `count` points, given the count
    /// range over all bins.
    pub fn elevation(&self, count: u64, min: u64, max: u64) -> f64 {
        let [lo, hi] = self.elevation_range;
        let t = if max > min {
            (count.saturating_sub(min)) as f64 / (max - min) as f64
        } else {
            1.0
        };
        (lo + t * (hi - lo)) * self.elevation_scale
    }
}

/// Initial camera for the 3D map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
    /// Camera tilt from straight down, degrees.
    pub pitch: f64,
}

impl MapView {
    pub fn centered_on(center: Centroid) -> Self {
        Self {
            lat: center.lat,
            lon: center.lon,
            zoom: 11.0,
            pitch: 50.0,
        }
    }

    /// Web-mercator ground resolution at this zoom and latitude.
    pub fn metres_per_pixel(&self) -> f64 {
        156_543.033_92 * self.lat.to_radians().cos() / 2f64.powf(self.zoom)
    }
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// One hexagonal cell with its point count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexBin {
    /// Axial coordinates of the cell.
    pub q: i64,
    pub r: i64,
    /// Cell centre in metres east/north of the projection origin.
    pub x_m: f64,
    pub y_m: f64,
    pub count: u64,
}

/// Project `(lat, lon)` to metres east/north of `origin` (equirectangular).
pub fn project(origin: Centroid, lat: f64, lon: f64) -> (f64, f64) {
    let x = (lon - origin.lon).to_radians() * origin.lat.to_radians().cos() * EARTH_RADIUS_M;
    let y = (lat - origin.lat).to_radians() * EARTH_RADIUS_M;
    (x, y)
}

/// Pointy-top hexagon containing `(x, y)` for circumradius `size`.
fn axial_cell(x: f64, y: f64, size: f64) -> (i64, i64) {
    let q = (3f64.sqrt() / 3.0 * x - y / 3.0) / size;
    let r = (2.0 / 3.0 * y) / size;
    cube_round(q, r)
}

fn cube_round(q: f64, r: f64) -> (i64, i64) {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq as i64, rr as i64)
}

fn cell_center(q: i64, r: i64, size: f64) -> (f64, f64) {
    let (q, r) = (q as f64, r as f64);
    (size * 3f64.sqrt() * (q + r / 2.0), size * 1.5 * r)
}

/// Count `points` (lat, lon) into hexagons of circumradius `radius_m`
/// around `origin`. Bins are ordered back to front (north first).
pub fn bin_points<I>(points: I, origin: Centroid, radius_m: f64) -> Vec<HexBin>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut counts: HashMap<(i64, i64), u64> = HashMap::new();
    for (lat, lon) in points {
        let (x, y) = project(origin, lat, lon);
        *counts.entry(axial_cell(x, y, radius_m)).or_default() += 1;
    }

    let mut bins: Vec<HexBin> = counts
        .into_iter()
        .map(|((q, r), count)| {
            let (x_m, y_m) = cell_center(q, r, radius_m);
            HexBin {
                q,
                r,
                x_m,
                y_m,
                count,
            }
        })
        .collect();
    bins.sort_by(|a, b| b.y_m.total_cmp(&a.y_m).then(a.x_m.total_cmp(&b.x_m)));
    bins
}
