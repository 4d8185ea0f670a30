use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampSecondType};
use chrono::{DateTime, NaiveDateTime};
use flate2::read::MultiGzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{PickupDataset, PickupEvent};

/// Column holding the combined date + time (after lower-casing headers).
pub const DATE_COLUMN: &str = "date/time";
pub const LAT_COLUMN: &str = "lat";
pub const LON_COLUMN: &str = "lon";
pub const BASE_COLUMN: &str = "base";

/// Public NYC trip sample for September 2014.
pub const DATA_URL: &str =
    "https://s3-us-west-2.amazonaws.com/streamlit-demo-data/uber-raw-data-sep14.csv.gz";

/// Row limit used when nothing else is configured.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Accepted textual timestamp layouts, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ---------------------------------------------------------------------------
// Errors and sources
// ---------------------------------------------------------------------------

/// Schema and row-level problems found while parsing a source.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: cannot parse timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },
    #[error("row {row}: '{value}' in column '{column}' is not a number")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` / `https://` strings become URLs, anything else a path.
    pub fn parse(s: &str) -> Self {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::Path(PathBuf::from(s))
        }
    }

    /// Last path segment, used for format detection.
    fn file_name(&self) -> String {
        match self {
            DataSource::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            DataSource::Url(u) => {
                let path = u.split(['?', '#']).next().unwrap_or(u);
                path.rsplit('/').next().unwrap_or(path).to_string()
            }
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => write!(f, "{u}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    CsvGz,
    Json,
    Parquet,
}

impl Format {
    fn detect(file_name: &str) -> Result<Self, DataError> {
        let name = file_name.to_ascii_lowercase();
        if name.ends_with(".gz") {
            Ok(Format::CsvGz)
        } else if name.ends_with(".csv") {
            Ok(Format::Csv)
        } else if name.ends_with(".json") {
            Ok(Format::Json)
        } else if name.ends_with(".parquet") || name.ends_with(".pq") {
            Ok(Format::Parquet)
        } else {
            Err(DataError::UnsupportedFormat(file_name.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load at most `max_rows` pickups from `source`. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, `Date/Time`, `Lat`, `Lon` (case-insensitive), optional `Base`
/// * `.csv.gz`  – the same, gzip-compressed
/// * `.json`    – `[{ "date/time": "...", "lat": 40.7, "lon": -74.0 }, ...]`
/// * `.parquet` – `date/time` as a timestamp or string column, numeric `lat`/`lon`
pub fn load(source: &DataSource, max_rows: usize) -> Result<PickupDataset> {
    let format = Format::detect(&source.file_name())?;

    let dataset = match source {
        DataSource::Path(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            match format {
                Format::Parquet => read_parquet(file, max_rows)?,
                text => read_text(text, BufReader::new(file), max_rows)?,
            }
        }
        DataSource::Url(url) => {
            log::info!("Downloading {url}");
            let body = reqwest::blocking::get(url.as_str())
                .with_context(|| format!("requesting {url}"))?
                .error_for_status()
                .with_context(|| format!("fetching {url}"))?
                .bytes()
                .context("reading response body")?;
            log::debug!("Downloaded {} bytes", body.len());
            match format {
                Format::Parquet => read_parquet(body, max_rows)?,
                text => read_text(text, &body[..], max_rows)?,
            }
        }
    };

    log::info!(
        "Loaded {} pickups from {source} ({:?} .. {:?})",
        dataset.len(),
        dataset.min_date(),
        dataset.max_date()
    );
    Ok(dataset)
}

fn read_text<R: Read>(format: Format, reader: R, max_rows: usize) -> Result<PickupDataset> {
    match format {
        Format::Csv => read_csv(reader, max_rows),
        Format::CsvGz => read_csv(MultiGzDecoder::new(reader), max_rows),
        Format::Json => read_json(reader, max_rows),
        Format::Parquet => bail!("parquet is not a text format"),
    }
}

// ---------------------------------------------------------------------------
// Field parsing
// ---------------------------------------------------------------------------

fn parse_timestamp(s: &str, row: usize) -> Result<NaiveDateTime, DataError> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| DataError::BadTimestamp {
            row,
            value: s.to_string(),
        })
}

fn parse_number(s: &str, row: usize, column: &'static str) -> Result<f64, DataError> {
    s.trim().parse::<f64>().map_err(|_| DataError::BadNumber {
        row,
        column,
        value: s.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Positions of the columns we read, after lower-casing headers.
struct CsvColumns {
    timestamp: usize,
    lat: usize,
    lon: usize,
    base: Option<usize>,
}

impl CsvColumns {
    fn locate(headers: &[String]) -> Result<Self, DataError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| find(name).ok_or_else(|| DataError::MissingColumn(name.to_string()));
        Ok(CsvColumns {
            timestamp: require(DATE_COLUMN)?,
            lat: require(LAT_COLUMN)?,
            lon: require(LON_COLUMN)?,
            base: find(BASE_COLUMN),
        })
    }

    fn parse(&self, record: &csv::StringRecord, row: usize) -> Result<PickupEvent, DataError> {
        let field = |idx: usize| record.get(idx).unwrap_or("");
        Ok(PickupEvent {
            timestamp: parse_timestamp(field(self.timestamp), row)?,
            lat: parse_number(field(self.lat), row, LAT_COLUMN)?,
            lon: parse_number(field(self.lon), row, LON_COLUMN)?,
            base: self
                .base
                .map(field)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
        })
    }
}

fn read_csv<R: Read>(reader: R, max_rows: usize) -> Result<PickupDataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let columns = CsvColumns::locate(&headers)?;

    let mut events = Vec::new();
    for (row_no, result) in reader.records().take(max_rows).enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        events.push(columns.parse(&record, row_no)?);
    }

    Ok(PickupDataset::from_events(events))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Keys are matched case-insensitively; numbers may also be quoted.
fn read_json<R: Read>(reader: R, max_rows: usize) -> Result<PickupDataset> {
    let root: JsonValue = serde_json::from_reader(reader).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut events = Vec::with_capacity(records.len().min(max_rows));
    for (row, rec) in records.iter().take(max_rows).enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {row} is not a JSON object"))?;
        let fields: BTreeMap<String, &JsonValue> =
            obj.iter().map(|(k, v)| (k.to_lowercase(), v)).collect();

        let get = |name: &str| {
            fields
                .get(name)
                .copied()
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };

        let timestamp = match get(DATE_COLUMN)? {
            JsonValue::String(s) => parse_timestamp(s, row)?,
            other => {
                return Err(DataError::BadTimestamp {
                    row,
                    value: other.to_string(),
                }
                .into());
            }
        };

        events.push(PickupEvent {
            timestamp,
            lat: json_number(get(LAT_COLUMN)?, row, LAT_COLUMN)?,
            lon: json_number(get(LON_COLUMN)?, row, LON_COLUMN)?,
            base: fields
                .get(BASE_COLUMN)
                .and_then(|v| v.as_str())
                .map(str::to_string),
        });
    }

    Ok(PickupDataset::from_events(events))
}

fn json_number(val: &JsonValue, row: usize, column: &'static str) -> Result<f64, DataError> {
    match val {
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| DataError::BadNumber {
            row,
            column,
            value: n.to_string(),
        }),
        JsonValue::String(s) => parse_number(s, row, column),
        other => Err(DataError::BadNumber {
            row,
            column,
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load pickups from a Parquet file.
///
/// Expected schema (column names case-insensitive):
/// - `date/time`: Timestamp (any unit) or Utf8
/// - `lat`, `lon`: any numeric type
/// - `base`: optional Utf8
///
/// Timezone-aware timestamps are read as UTC wall-clock time.
fn read_parquet<R: ChunkReader + 'static>(reader: R, max_rows: usize) -> Result<PickupDataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(reader)
        .context("reading parquet metadata")?;
    let reader = builder
        .with_limit(max_rows)
        .build()
        .context("building parquet reader")?;

    let mut events = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let find = |name: &str| {
            schema
                .fields()
                .iter()
                .position(|f| f.name().to_lowercase() == name)
        };
        let require = |name: &str| find(name).ok_or_else(|| DataError::MissingColumn(name.to_string()));

        let first_row = events.len();
        let timestamps = timestamp_values(batch.column(require(DATE_COLUMN)?), first_row)?;
        let lats = float_values(batch.column(require(LAT_COLUMN)?), first_row, LAT_COLUMN)?;
        let lons = float_values(batch.column(require(LON_COLUMN)?), first_row, LON_COLUMN)?;
        let bases = match find(BASE_COLUMN) {
            Some(idx) => string_values(batch.column(idx))?,
            None => vec![None; batch.num_rows()],
        };

        for (((timestamp, lat), lon), base) in timestamps.into_iter().zip(lats).zip(lons).zip(bases) {
            events.push(PickupEvent {
                timestamp,
                lat,
                lon,
                base,
            });
        }
    }

    events.truncate(max_rows);
    Ok(PickupDataset::from_events(events))
}

// -- Arrow helpers --

/// Read a timestamp or string column as naive date-times.
fn timestamp_values(col: &ArrayRef, first_row: usize) -> Result<Vec<NaiveDateTime>> {
    let null_error = |i: usize| DataError::BadTimestamp {
        row: first_row + i,
        value: "<null>".to_string(),
    };

    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(col, &DataType::Utf8).context("casting timestamps to text")?;
            let strings = strings.as_string::<i32>();
            (0..strings.len())
                .map(|i| -> Result<NaiveDateTime> {
                    if strings.is_null(i) {
                        return Err(null_error(i).into());
                    }
                    Ok(parse_timestamp(strings.value(i), first_row + i)?)
                })
                .collect()
        }
        DataType::Timestamp(_, tz) => {
            let secs = cast(col, &DataType::Timestamp(TimeUnit::Second, tz.clone()))
                .context("normalising timestamp unit")?;
            let secs = secs.as_primitive::<TimestampSecondType>();
            (0..secs.len())
                .map(|i| -> Result<NaiveDateTime> {
                    if secs.is_null(i) {
                        return Err(null_error(i).into());
                    }
                    DateTime::from_timestamp(secs.value(i), 0)
                        .map(|dt| dt.naive_utc())
                        .ok_or_else(|| {
                            DataError::BadTimestamp {
                                row: first_row + i,
                                value: secs.value(i).to_string(),
                            }
                            .into()
                        })
                })
                .collect()
        }
        other => bail!("'{DATE_COLUMN}' has type {other:?}, expected Timestamp or Utf8"),
    }
}

fn float_values(col: &ArrayRef, first_row: usize, column: &'static str) -> Result<Vec<f64>> {
    let values = cast(col, &DataType::Float64)
        .with_context(|| format!("'{column}' is not numeric"))?;
    let values = values.as_primitive::<Float64Type>();
    (0..values.len())
        .map(|i| -> Result<f64> {
            if values.is_null(i) {
                return Err(DataError::BadNumber {
                    row: first_row + i,
                    column,
                    value: "<null>".to_string(),
                }
                .into());
            }
            Ok(values.value(i))
        })
        .collect()
}

fn string_values(col: &ArrayRef) -> Result<Vec<Option<String>>> {
    let strings = cast(col, &DataType::Utf8).context("casting base column to text")?;
    let strings = strings.as_string::<i32>();
    Ok(strings.iter().map(|s| s.map(str::to_string)).collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::Timelike;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    const UBER_CSV: &str = "\
Date/Time,Lat,Lon,Base
9/1/2014 0:01:00,40.2201,-74.0021,B02512
9/1/2014 17:45:00,40.7500,-74.0027,B02512
9/2/2014 23:59:59,40.7316,-73.9873,B02598
";

    #[test]
    fn csv_headers_are_lowercased_and_parsed() {
        let ds = read_csv(UBER_CSV.as_bytes(), 100).unwrap();
        assert_eq!(ds.len(), 3);
        let first = &ds.events[0];
        assert_eq!(first.timestamp.to_string(), "2014-09-01 00:01:00");
        assert_eq!(first.lat, 40.2201);
        assert_eq!(first.lon, -74.0021);
        assert_eq!(first.base.as_deref(), Some("B02512"));
        assert_eq!(ds.events[1].hour(), 17);
        assert_eq!(ds.available_dates.len(), 2);
    }

    #[test]
    fn csv_respects_row_limit() {
        let ds = read_csv(UBER_CSV.as_bytes(), 2).unwrap();
        assert_eq!(ds.len(), 2);
        let none = read_csv(UBER_CSV.as_bytes(), 0).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn csv_without_base_column() {
        let csv = "date/time,lat,lon\n2014-09-03 08:30:00,40.7,-74.0\n";
        let ds = read_csv(csv.as_bytes(), 10).unwrap();
        assert_eq!(ds.events[0].base, None);
        assert_eq!(ds.events[0].hour(), 8);
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let csv = "Date/Time,Lat\n9/1/2014 0:01:00,40.2\n";
        let err = read_csv(csv.as_bytes(), 10).unwrap_err();
        match err.downcast_ref::<DataError>() {
            Some(DataError::MissingColumn(col)) => assert_eq!(col, "lon"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn csv_bad_values_name_the_row() {
        let csv = "Date/Time,Lat,Lon\n9/1/2014 0:01:00,40.2,-74.0\nyesterday,40.2,-74.0\n";
        let err = read_csv(csv.as_bytes(), 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::BadTimestamp { row: 1, .. })
        ));

        let csv = "Date/Time,Lat,Lon\n9/1/2014 0:01:00,north,-74.0\n";
        let err = read_csv(csv.as_bytes(), 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::BadNumber { row: 0, column: "lat", .. })
        ));
    }

    #[test]
    fn gzip_csv_is_decoded() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(UBER_CSV.as_bytes()).unwrap();
        let bytes = enc.finish().unwrap();
        let ds = read_text(Format::CsvGz, bytes.as_slice(), 10).unwrap();
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn timestamp_layouts() {
        for s in [
            "9/1/2014 13:05:00",
            "09/01/2014 13:05",
            "2014-09-01 13:05:00",
            "2014-09-01T13:05:00.250",
            "2014-09-01 13:05",
        ] {
            let ts = parse_timestamp(s, 0).unwrap_or_else(|e| panic!("{s}: {e}"));
            assert_eq!(ts.date().to_string(), "2014-09-01");
            assert_eq!(ts.hour(), 13);
        }
    }

    #[test]
    fn json_records() {
        let json = r#"[
            {"Date/Time": "9/1/2014 5:00:00", "Lat": 40.7, "Lon": "-74.1", "Base": "B1"},
            {"date/time": "2014-09-01 06:00:00", "lat": 40.8, "lon": -74.2}
        ]"#;
        let ds = read_json(json.as_bytes(), 10).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.events[0].lon, -74.1);
        assert_eq!(ds.events[0].base.as_deref(), Some("B1"));
        assert_eq!(ds.events[1].hour(), 6);

        let limited = read_json(json.as_bytes(), 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn parquet_timestamp_and_string_columns() {
        use std::sync::Arc;

        use arrow::array::{Float32Array, StringArray, TimestampMillisecondArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let ts = NaiveDateTime::parse_from_str("2014-09-01 17:45:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let millis = ts.and_utc().timestamp_millis();

        let schema = Arc::new(Schema::new(vec![
            Field::new("Date/Time", DataType::Timestamp(TimeUnit::Millisecond, None), false),
            Field::new("Lat", DataType::Float32, false),
            Field::new("Lon", DataType::Float64, false),
            Field::new("Base", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(TimestampMillisecondArray::from(vec![millis, millis + 3_600_000])),
                Arc::new(Float32Array::from(vec![40.5, 40.75])),
                Arc::new(arrow::array::Float64Array::from(vec![-74.0, -73.5])),
                Arc::new(StringArray::from(vec![Some("B02512"), None])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!("pickups-loader-{}.parquet", std::process::id()));
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load(&DataSource::Path(path.clone()), 10).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.events[0].timestamp, ts);
        assert_eq!(ds.events[1].hour(), 18);
        assert_eq!(ds.events[1].lat, 40.75);
        assert_eq!(ds.events[0].base.as_deref(), Some("B02512"));
        assert_eq!(ds.events[1].base, None);

        let limited = load(&DataSource::Path(path.clone()), 1).unwrap();
        assert_eq!(limited.len(), 1);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn format_detection() {
        let fmt = |s: &str| Format::detect(&DataSource::parse(s).file_name());
        assert_eq!(fmt(DATA_URL).unwrap(), Format::CsvGz);
        assert_eq!(fmt("data/pickups.CSV").unwrap(), Format::Csv);
        assert_eq!(fmt("https://host/x.parquet?sig=abc").unwrap(), Format::Parquet);
        assert_eq!(fmt("records.json").unwrap(), Format::Json);
        assert!(matches!(fmt("notes.txt"), Err(DataError::UnsupportedFormat(_))));
    }

    #[test]
    fn source_parsing() {
        assert!(matches!(DataSource::parse(DATA_URL), DataSource::Url(_)));
        assert!(matches!(DataSource::parse("./local.csv"), DataSource::Path(_)));
    }
}
