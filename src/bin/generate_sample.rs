use std::sync::Arc;

use arrow::array::{Float64Array, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Row layout of the NYC trip CSV files.
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Date/Time")]
    date_time: String,
    #[serde(rename = "Lat")]
    lat: f64,
    #[serde(rename = "Lon")]
    lon: f64,
    #[serde(rename = "Base")]
    base: &'a str,
}

struct Pickup {
    timestamp: NaiveDateTime,
    lat: f64,
    lon: f64,
    base: &'static str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Index into `weights`, picked proportionally.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut pick = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if pick < *w {
                return i;
            }
            pick -= w;
        }
        weights.len() - 1
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Pickup hotspots: (lat, lon, spread in degrees, weight)
    let hotspots = [
        (40.7580, -73.9855, 0.012, 5.0), // Midtown
        (40.7205, -74.0009, 0.010, 3.0), // SoHo
        (40.7061, -74.0087, 0.008, 2.0), // Financial District
        (40.6413, -73.7781, 0.006, 1.0), // JFK
        (40.7769, -73.8740, 0.004, 1.0), // LaGuardia
        (40.6782, -73.9442, 0.020, 1.5), // Brooklyn
    ];
    let spot_weights: Vec<f64> = hotspots.iter().map(|h| h.3).collect();

    // Relative demand by hour of day: quiet night, morning and evening peaks.
    let hour_weights: Vec<f64> = (0..24)
        .map(|h: i32| {
            let morning = (-((h - 8) as f64).powi(2) / 8.0).exp();
            let evening = (-((h - 18) as f64).powi(2) / 10.0).exp();
            0.15 + morning + 1.4 * evening
        })
        .collect();

    let bases = ["B02512", "B02598", "B02617", "B02682", "B02764"];
    let first_day = NaiveDate::from_ymd_opt(2014, 9, 1).expect("valid date");
    let days = 7;
    let per_day = 2_000;

    let mut pickups = Vec::with_capacity(days * per_day);
    for day in 0..days {
        let date = first_day + Duration::days(day as i64);
        for _ in 0..per_day {
            let hour = rng.weighted(&hour_weights) as u32;
            let second = (rng.next_u64() % 3600) as i64;
            let timestamp = date.and_hms_opt(hour, 0, 0).expect("valid hour") + Duration::seconds(second);

            let (lat, lon, spread, _) = hotspots[rng.weighted(&spot_weights)];
            pickups.push(Pickup {
                timestamp,
                lat: rng.gauss(lat, spread),
                lon: rng.gauss(lon, spread * 1.3),
                base: bases[(rng.next_u64() % bases.len() as u64) as usize],
            });
        }
    }
    pickups.sort_by_key(|p| p.timestamp);

    write_parquet("sample_pickups.parquet", &pickups);
    write_csv("sample_pickups.csv", &pickups);

    println!(
        "Wrote {} pickups over {days} days to sample_pickups.parquet and sample_pickups.csv",
        pickups.len()
    );
}

fn write_parquet(path: &str, pickups: &[Pickup]) {
    let timestamps = TimestampSecondArray::from(
        pickups
            .iter()
            .map(|p| p.timestamp.and_utc().timestamp())
            .collect::<Vec<_>>(),
    );
    let lats = Float64Array::from(pickups.iter().map(|p| p.lat).collect::<Vec<_>>());
    let lons = Float64Array::from(pickups.iter().map(|p| p.lon).collect::<Vec<_>>());
    let bases = StringArray::from(pickups.iter().map(|p| p.base).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Date/Time", DataType::Timestamp(TimeUnit::Second, None), false),
        Field::new("Lat", DataType::Float64, false),
        Field::new("Lon", DataType::Float64, false),
        Field::new("Base", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(timestamps),
            Arc::new(lats),
            Arc::new(lons),
            Arc::new(bases),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn write_csv(path: &str, pickups: &[Pickup]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create output file");
    for p in pickups {
        writer
            .serialize(CsvRow {
                date_time: p.timestamp.format("%-m/%-d/%Y %-H:%M:%S").to_string(),
                lat: (p.lat * 1e4).round() / 1e4,
                lon: (p.lon * 1e4).round() / 1e4,
                base: p.base,
            })
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");
}
