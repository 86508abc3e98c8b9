/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read cells → derive → MovieTable   (DatasetCache)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ MovieTable  │  Arc'd immutable rows + row selection
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec → new view, order preserved
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group / rank / correlate → plain values
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ explore   │  custom scatter, comparisons, genre deep dive
///   └──────────┘
/// ```

pub mod aggregate;
pub mod derive;
pub mod error;
pub mod explore;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod table;

pub use error::{DataError, Result};
pub use filter::{filter, FilterSpec, Thresholds};
pub use loader::{load_file, DatasetCache};
pub use model::{Column, Movie, Value};
pub use table::{MovieTable, SourceInfo};
