//! Labeled n-dimensional scientific datasets.
//!
//! A [`Dataset`] wraps a lazily evaluated array together with structural
//! attributes (`data_type`, `units`, `quantity`, ...), one [`Dimension`] per
//! axis and free-form metadata. [`Dataset::plot`] picks a view from the data
//! type and the dimension types and shows it in a native window.
//!
//! ```no_run
//! use ndarray::Array3;
//! use rusty_sid::{Dataset, Dimension, DimensionType};
//!
//! let mut ds = Dataset::from_array(Array3::<f64>::zeros((4, 5, 10)), "scan");
//! ds.set_data_type("spectrum_image")?;
//! ds.set_dimension(0, Dimension::new("x", vec![0.0, 1.0, 2.0, 3.0])?
//!     .with_dimension_type(DimensionType::Spatial))?;
//! ds.set_attr("operator", "nobody")?;
//! # Ok::<(), rusty_sid::DatasetError>(())
//! ```

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod plot;
pub mod state;
pub mod ui;

pub use color::Colormap;
pub use config::ViewerConfig;
pub use data::dataset::{DataType, Dataset};
pub use data::dimension::{Dimension, DimensionType};
pub use data::lazy::{AxisIndex, LazyArray};
pub use data::model::{Metadata, MetadataValue};
pub use error::{DatasetError, PlotError};
pub use plot::PlotMode;
