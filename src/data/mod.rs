/// Data layer: datasets, dimensions, metadata and file loading.
///
/// Architecture:
/// ```text
///  ndarray / .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │   Dataset    │  LazyArray + Vec<Dimension> + attributes
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  select   │  numpy-style indexing, deferred until compute()
///   └──────────┘
/// ```

pub mod dataset;
pub mod dimension;
pub(crate) mod float_repr;
pub mod lazy;
pub mod loader;
pub mod model;
