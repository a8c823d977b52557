use thiserror::Error;

use crate::data::dataset::DataType;

/// Errors raised while building, annotating or slicing a [`Dataset`](crate::Dataset).
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("dimension '{name}' has {len} values but axis {axis} has extent {extent}")]
    DimensionLength {
        name: String,
        len: usize,
        axis: usize,
        extent: usize,
    },

    #[error("axis {axis} is out of range for a dataset of rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },

    #[error("index {index} is out of bounds for axis {axis} with extent {extent}")]
    IndexOutOfBounds {
        index: isize,
        axis: usize,
        extent: usize,
    },

    #[error("too many indices: dataset has rank {rank} but {given} were given")]
    TooManyIndices { rank: usize, given: usize },

    #[error("slice step must be at least 1, got {0}")]
    InvalidStep(usize),

    #[error("dataset of rank {rank} needs {rank} dimensions, found {found}")]
    DimensionCount { rank: usize, found: usize },

    #[error("names must not be empty")]
    EmptyName,

    #[error("'{0}' is a reserved dataset attribute")]
    ReservedName(String),

    #[error("'{0}' is already used by another dimension or attribute")]
    NameConflict(String),

    #[error("no dimension named '{0}'")]
    UnknownDimension(String),

    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    #[error("unknown dimension type '{0}'")]
    UnknownDimensionType(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Errors raised by plot dispatch and rendering.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("datasets with data type {0} cannot be plotted; set a data type first")]
    Unplottable(DataType),

    #[error("data type {data_type} is not supported for a dataset of rank {ndim}")]
    Unsupported { data_type: DataType, ndim: usize },

    #[error("data type {data_type} needs {expected}, found {found}")]
    MissingDimensions {
        data_type: DataType,
        expected: &'static str,
        found: usize,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("display error: {0}")]
    Display(String),
}
