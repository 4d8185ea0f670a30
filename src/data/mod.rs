/// Data layer: core types, loading, filtering and derived statistics.
///
/// Architecture:
/// ```text
///  .csv / .csv.gz / .json / .parquet  (path or URL)
///        │
///        ▼
///   ┌──────────┐     ┌───────┐
///   │  loader   │◄────│ cache │  keyed by (source, row limit)
///   └──────────┘     └───────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ PickupDataset  │  Vec<PickupEvent>, date index
///   └───────────────┘
///        │
///        ├──────────────────┐
///        ▼                  ▼
///   ┌──────────┐      ┌─────────┐
///   │  filter   │      │  stats  │  hour histogram, centroid
///   └──────────┘      └─────────┘
///   TimeSelection → indices + description + centroid
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
