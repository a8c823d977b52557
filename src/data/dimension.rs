use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Placeholder used for units and quantities nobody has filled in yet.
pub const GENERIC: &str = "generic";

// ---------------------------------------------------------------------------
// DimensionType – semantic role of an axis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionType {
    #[default]
    #[serde(rename = "generic", alias = "unknown")]
    Unknown,
    Spatial,
    Reciprocal,
    Spectral,
    Temporal,
}

impl DimensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionType::Unknown => GENERIC,
            DimensionType::Spatial => "spatial",
            DimensionType::Reciprocal => "reciprocal",
            DimensionType::Spectral => "spectral",
            DimensionType::Temporal => "temporal",
        }
    }

    /// Spatial and reciprocal axes span images.
    pub fn is_image(&self) -> bool {
        matches!(self, DimensionType::Spatial | DimensionType::Reciprocal)
    }

    /// Spectral and temporal axes carry spectra / traces.
    pub fn is_spectral(&self) -> bool {
        matches!(self, DimensionType::Spectral | DimensionType::Temporal)
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DimensionType {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" | "unknown" | "" => Ok(DimensionType::Unknown),
            "spatial" => Ok(DimensionType::Spatial),
            "reciprocal" => Ok(DimensionType::Reciprocal),
            "spectral" => Ok(DimensionType::Spectral),
            "temporal" | "time" => Ok(DimensionType::Temporal),
            _ => Err(DatasetError::UnknownDimensionType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Dimension – coordinate axis descriptor
// ---------------------------------------------------------------------------

/// A named, unit-tagged coordinate sequence for one axis of a dataset.
///
/// `name` and `values` are only changed through the owning
/// [`Dataset`](crate::Dataset), which keeps them consistent with the array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    name: String,
    #[serde(with = "super::float_repr::vec")]
    values: Vec<f64>,
    #[serde(default = "generic_string")]
    pub units: String,
    #[serde(default = "generic_string")]
    pub quantity: String,
    #[serde(default)]
    pub dimension_type: DimensionType,
}

fn generic_string() -> String {
    GENERIC.to_string()
}

impl Dimension {
    /// Create a dimension with generic units, quantity and type.
    pub fn new(name: impl Into<String>, values: impl Into<Vec<f64>>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DatasetError::EmptyName);
        }
        Ok(Self {
            name,
            values: values.into(),
            units: GENERIC.to_string(),
            quantity: GENERIC.to_string(),
            dimension_type: DimensionType::Unknown,
        })
    }

    /// Placeholder dimension for `axis`: named `a`, `b`, `c`, ... with values
    /// `0..len`.
    pub fn generic(axis: usize, len: usize) -> Self {
        Self {
            name: generic_name(axis),
            values: (0..len).map(|i| i as f64).collect(),
            units: GENERIC.to_string(),
            quantity: GENERIC.to_string(),
            dimension_type: DimensionType::Unknown,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = quantity.into();
        self
    }

    pub fn with_dimension_type(mut self, dimension_type: DimensionType) -> Self {
        self.dimension_type = dimension_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Axis label for plots, e.g. `Bias (V)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.quantity, self.units)
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Keep every `step`-th value in `start..end`.
    pub(crate) fn slice(&self, start: usize, end: usize, step: usize) -> Self {
        let values = if start < end {
            self.values[start..end].iter().step_by(step).copied().collect()
        } else {
            Vec::new()
        };
        Self {
            values,
            ..self.clone()
        }
    }
}

fn generic_name(axis: usize) -> String {
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    match LETTERS.get(axis) {
        Some(&c) => (c as char).to_string(),
        None => format!("dim_{axis}"),
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:  {} ({}) of size ({},)",
            self.name,
            self.quantity,
            self.units,
            self.values.len()
        )
    }
}
