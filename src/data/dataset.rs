use std::fmt;
use std::str::FromStr;

use ndarray::{Array, ArrayD, Dimension as NdDimension, IxDyn};
use serde::{Deserialize, Serialize};

use super::dimension::{Dimension, DimensionType, GENERIC};
use super::lazy::{resolve, AxisIndex, LazyArray, SliceOp};
use super::model::{Metadata, MetadataValue};
use crate::error::{DatasetError, Result};

/// Attribute names that belong to the dataset structure and cannot be used
/// for free-form metadata or dimension names.
pub const RESERVED_ATTRIBUTES: &[&str] = &[
    "name",
    "title",
    "data_type",
    "units",
    "quantity",
    "modality",
    "source",
    "shape",
    "dimensions",
    "original_metadata",
];

// ---------------------------------------------------------------------------
// DataType – how the whole dataset should be interpreted
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    #[serde(rename = "generic", alias = "unknown")]
    Unknown,
    Spectrum,
    LinePlot,
    LinePlotFamily,
    Image,
    ImageMap,
    ImageStack,
    #[serde(alias = "spectrum_image")]
    SpectralImage,
    #[serde(rename = "image_4d")]
    Image4D,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Unknown => GENERIC,
            DataType::Spectrum => "spectrum",
            DataType::LinePlot => "line_plot",
            DataType::LinePlotFamily => "line_plot_family",
            DataType::Image => "image",
            DataType::ImageMap => "image_map",
            DataType::ImageStack => "image_stack",
            DataType::SpectralImage => "spectral_image",
            DataType::Image4D => "image_4d",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "generic" | "unknown" | "" => Ok(DataType::Unknown),
            "spectrum" => Ok(DataType::Spectrum),
            "line_plot" => Ok(DataType::LinePlot),
            "line_plot_family" => Ok(DataType::LinePlotFamily),
            "image" => Ok(DataType::Image),
            "image_map" => Ok(DataType::ImageMap),
            "image_stack" => Ok(DataType::ImageStack),
            "spectral_image" | "spectrum_image" => Ok(DataType::SpectralImage),
            "image_4d" | "image4d" => Ok(DataType::Image4D),
            _ => Err(DatasetError::UnknownDataType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – labeled, lazily-backed n-dimensional array
// ---------------------------------------------------------------------------

/// A labeled n-dimensional array with structural attributes, one
/// [`Dimension`] per axis and free-form metadata.
///
/// Invariant: `dimensions().len() == ndim()` and every dimension has as many
/// values as its axis has elements.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub title: String,
    pub data_type: DataType,
    pub units: String,
    pub quantity: String,
    pub modality: String,
    pub source: String,
    /// Unvalidated metadata carried over from imported files.
    pub original_metadata: Metadata,
    data: LazyArray,
    dimensions: Vec<Dimension>,
    attributes: Metadata,
}

impl Dataset {
    /// Wrap any ndarray array. Every axis gets a generic dimension.
    pub fn from_array<D: NdDimension>(array: Array<f64, D>, name: impl Into<String>) -> Self {
        Self::from_lazy(LazyArray::new(array.into_dyn()), name.into())
    }

    /// Build from a shape and row-major values.
    pub fn from_shape_vec(
        shape: &[usize],
        values: Vec<f64>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let array = ArrayD::from_shape_vec(IxDyn(shape), values)?;
        Ok(Self::from_array(array, name))
    }

    fn from_lazy(data: LazyArray, name: String) -> Self {
        let dimensions = data
            .shape()
            .iter()
            .enumerate()
            .map(|(axis, &len)| Dimension::generic(axis, len))
            .collect();
        log::debug!("created dataset '{name}' with shape {:?}", data.shape());
        Self {
            title: name.clone(),
            name,
            data_type: DataType::Unknown,
            units: GENERIC.to_string(),
            quantity: GENERIC.to_string(),
            modality: GENERIC.to_string(),
            source: GENERIC.to_string(),
            original_metadata: Metadata::new(),
            data,
            dimensions,
            attributes: Metadata::new(),
        }
    }

    // -- Shape --

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn lazy(&self) -> &LazyArray {
        &self.data
    }

    /// Materialize the data.
    pub fn compute(&self) -> ArrayD<f64> {
        self.data.compute()
    }

    // -- Structural attributes --

    /// Set `data_type` from its string name (`"spectrum_image"`, `"image"`, ...).
    pub fn set_data_type(&mut self, data_type: &str) -> Result<()> {
        self.data_type = data_type.parse()?;
        Ok(())
    }

    // -- Free-form metadata --

    /// Attach a metadata attribute. Returns the previous value under `key`.
    pub fn set_attr(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Result<Option<MetadataValue>> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(DatasetError::EmptyName);
        }
        if is_reserved(&key) {
            return Err(DatasetError::ReservedName(key));
        }
        if self.dimensions.iter().any(|d| d.name() == key) {
            return Err(DatasetError::NameConflict(key));
        }
        Ok(self.attributes.insert(key, value.into()))
    }

    pub fn attr(&self, key: &str) -> Option<&MetadataValue> {
        self.attributes.get(key)
    }

    pub fn attr_mut(&mut self, key: &str) -> Option<&mut MetadataValue> {
        self.attributes.get_mut(key)
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<MetadataValue> {
        self.attributes.remove(key)
    }

    pub fn attributes(&self) -> &Metadata {
        &self.attributes
    }

    // -- Dimensions --

    /// Bind `dimension` to `axis`, returning the dimension it replaces.
    pub fn set_dimension(&mut self, axis: usize, dimension: Dimension) -> Result<Dimension> {
        let rank = self.ndim();
        let extent = *self
            .shape()
            .get(axis)
            .ok_or(DatasetError::AxisOutOfRange { axis, rank })?;
        if dimension.len() != extent {
            return Err(DatasetError::DimensionLength {
                name: dimension.name().to_string(),
                len: dimension.len(),
                axis,
                extent,
            });
        }
        self.check_dimension_name(axis, dimension.name())?;

        log::debug!(
            "dataset '{}': binding dimension '{}' ({}) to axis {axis}",
            self.name,
            dimension.name(),
            dimension.dimension_type
        );
        Ok(std::mem::replace(&mut self.dimensions[axis], dimension))
    }

    pub fn rename_dimension(&mut self, axis: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let rank = self.ndim();
        if axis >= rank {
            return Err(DatasetError::AxisOutOfRange { axis, rank });
        }
        if name.trim().is_empty() {
            return Err(DatasetError::EmptyName);
        }
        self.check_dimension_name(axis, &name)?;
        self.dimensions[axis].set_name(name);
        Ok(())
    }

    fn check_dimension_name(&self, axis: usize, name: &str) -> Result<()> {
        if is_reserved(name) {
            return Err(DatasetError::ReservedName(name.to_string()));
        }
        let taken_by_other_axis = self
            .dimensions
            .iter()
            .enumerate()
            .any(|(i, d)| i != axis && d.name() == name);
        if taken_by_other_axis || self.attributes.contains_key(name) {
            return Err(DatasetError::NameConflict(name.to_string()));
        }
        Ok(())
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, axis: usize) -> Option<&Dimension> {
        self.dimensions.get(axis)
    }

    pub fn dimension_mut(&mut self, axis: usize) -> Option<&mut Dimension> {
        self.dimensions.get_mut(axis)
    }

    /// Dimension by name.
    pub fn dim(&self, name: &str) -> Result<&Dimension> {
        self.dimensions
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| DatasetError::UnknownDimension(name.to_string()))
    }

    pub fn dim_mut(&mut self, name: &str) -> Result<&mut Dimension> {
        self.dimensions
            .iter_mut()
            .find(|d| d.name() == name)
            .ok_or_else(|| DatasetError::UnknownDimension(name.to_string()))
    }

    /// Axis of the dimension called `name`.
    pub fn axis_of(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name() == name)
    }

    pub fn dimensions_of_type(&self, dimension_type: DimensionType) -> Vec<usize> {
        self.axes_where(|t| t == dimension_type)
    }

    /// Axes tagged spatial or reciprocal.
    pub fn image_dims(&self) -> Vec<usize> {
        self.axes_where(|t| t.is_image())
    }

    /// Axes tagged spectral or temporal.
    pub fn spectral_dims(&self) -> Vec<usize> {
        self.axes_where(|t| t.is_spectral())
    }

    fn axes_where(&self, pred: impl Fn(DimensionType) -> bool) -> Vec<usize> {
        self.dimensions
            .iter()
            .enumerate()
            .filter(|(_, d)| pred(d.dimension_type))
            .map(|(axis, _)| axis)
            .collect()
    }

    // -- Indexing --

    /// numpy-style selection. Indexed axes disappear together with their
    /// dimension; ranged axes keep a sliced dimension. The data stays lazy.
    pub fn select(&self, indices: &[AxisIndex]) -> Result<Dataset> {
        let resolved = resolve(self.shape(), indices)?;

        // Ops come highest axis first, so removals don't shift pending axes.
        let mut dimensions = self.dimensions.clone();
        for op in &resolved.ops {
            match *op {
                SliceOp::Index { axis, .. } => {
                    dimensions.remove(axis);
                }
                SliceOp::Range {
                    axis,
                    start,
                    end,
                    step,
                } => {
                    dimensions[axis] = dimensions[axis].slice(start, end, step);
                }
            }
        }

        Ok(Dataset {
            name: self.name.clone(),
            title: self.title.clone(),
            data_type: self.data_type,
            units: self.units.clone(),
            quantity: self.quantity.clone(),
            modality: self.modality.clone(),
            source: self.source.clone(),
            original_metadata: self.original_metadata.clone(),
            data: self.data.select_resolved(resolved),
            dimensions,
            attributes: self.attributes.clone(),
        })
    }

    /// Rebuild from parts, checking every dimension against the data.
    pub(crate) fn with_dimensions(mut self, dimensions: Vec<Dimension>) -> Result<Self> {
        if dimensions.len() != self.ndim() {
            return Err(DatasetError::DimensionCount {
                rank: self.ndim(),
                found: dimensions.len(),
            });
        }
        for (axis, dimension) in dimensions.iter().enumerate() {
            let extent = self.shape()[axis];
            if dimension.len() != extent {
                return Err(DatasetError::DimensionLength {
                    name: dimension.name().to_string(),
                    len: dimension.len(),
                    axis,
                    extent,
                });
            }
            if dimension.name().trim().is_empty() {
                return Err(DatasetError::EmptyName);
            }
            if is_reserved(dimension.name()) {
                return Err(DatasetError::ReservedName(dimension.name().to_string()));
            }
            if dimensions[..axis].iter().any(|d| d.name() == dimension.name()) {
                return Err(DatasetError::NameConflict(dimension.name().to_string()));
            }
        }
        self.dimensions = dimensions;
        Ok(self)
    }

    /// Swap in a whole attribute table. Every key is checked as in `set_attr`.
    pub(crate) fn replace_attributes(&mut self, attributes: Metadata) -> Result<()> {
        self.attributes.clear();
        for (key, value) in attributes {
            self.set_attr(key, value)?;
        }
        Ok(())
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset '{}' of type {} with:", self.name, self.data_type)?;
        let shape: Vec<String> = self.shape().iter().map(|n| n.to_string()).collect();
        writeln!(
            f,
            "  lazy array<f64>: shape ({}), {} pending ops",
            shape.join(", "),
            self.data.pending()
        )?;
        writeln!(f, "  data contains: {} ({})", self.quantity, self.units)?;
        writeln!(f, "  and dimensions:")?;
        for dim in &self.dimensions {
            writeln!(f, "    {dim} [{}]", dim.dimension_type)?;
        }
        if !self.attributes.is_empty() {
            let keys: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
            writeln!(f, "  with attributes: {}", keys.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array3};

    fn sample() -> Dataset {
        let data = Array3::from_shape_fn((4, 5, 10), |(i, j, k)| (i * 100 + j * 10 + k) as f64);
        Dataset::from_array(data, "random")
    }

    #[test]
    fn construction_sets_generic_defaults() {
        let ds = sample();
        assert_eq!(ds.shape(), &[4, 5, 10]);
        assert_eq!(ds.data_type, DataType::Unknown);
        assert_eq!(ds.units, GENERIC);
        assert_eq!(ds.quantity, GENERIC);
        assert_eq!(ds.title, "random");
        let names: Vec<&str> = ds.dimensions().iter().map(Dimension::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(ds.dimension(2).unwrap().len(), 10);
    }

    #[test]
    fn from_shape_vec_checks_length() {
        assert!(matches!(
            Dataset::from_shape_vec(&[2, 3], vec![0.0; 5], "bad"),
            Err(DatasetError::Shape(_))
        ));
        let ds = Dataset::from_shape_vec(&[2, 3], vec![0.0; 6], "ok").unwrap();
        assert_eq!(ds.len(), 6);
    }

    #[test]
    fn data_type_parsing() {
        let mut ds = sample();
        ds.set_data_type("spectrum_image").unwrap();
        assert_eq!(ds.data_type, DataType::SpectralImage);
        ds.set_data_type("IMAGE").unwrap();
        assert_eq!(ds.data_type, DataType::Image);
        assert!(matches!(
            ds.set_data_type("hologram"),
            Err(DatasetError::UnknownDataType(_))
        ));
        assert_eq!(ds.data_type, DataType::Image);
    }

    #[test]
    fn attributes_round_trip() {
        let mut ds = sample();
        ds.set_attr("counting", vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        ds.set_attr(
            "something",
            [("nothing", MetadataValue::from(" ")), ("value", 6.8.into())],
        )
        .unwrap();
        ds.set_attr("acquired", "nowhere").unwrap();

        assert_eq!(ds.attr("counting").unwrap().to_string(), "[0, 1, 2, 3, 4]");
        assert_eq!(
            ds.attr("something").unwrap().to_string(),
            "{nothing: \" \", value: 6.8}"
        );
        let previous = ds.set_attr("acquired", "lab").unwrap();
        assert_eq!(previous, Some(MetadataValue::from("nowhere")));
        assert_eq!(ds.remove_attr("acquired"), Some(MetadataValue::from("lab")));
        assert!(ds.attr("acquired").is_none());
    }

    #[test]
    fn reserved_and_dimension_names_are_rejected() {
        let mut ds = sample();
        assert!(matches!(
            ds.set_attr("units", "nA"),
            Err(DatasetError::ReservedName(_))
        ));
        assert!(matches!(
            ds.set_attr("a", 1),
            Err(DatasetError::NameConflict(_))
        ));
    }

    #[test]
    fn binding_checks_length_and_axis() {
        let mut ds = sample();
        let x = Dimension::new("x", vec![0.0, 1.0, 2.0]).unwrap();
        assert!(matches!(
            ds.set_dimension(0, x),
            Err(DatasetError::DimensionLength { len: 3, axis: 0, extent: 4, .. })
        ));
        let far = Dimension::new("far", vec![0.0]).unwrap();
        assert!(matches!(
            ds.set_dimension(3, far),
            Err(DatasetError::AxisOutOfRange { axis: 3, rank: 3 })
        ));

        let x = Dimension::new("x", vec![0.0, 1.0, 2.0, 3.0])
            .unwrap()
            .with_units("um")
            .with_dimension_type(DimensionType::Spatial);
        let previous = ds.set_dimension(0, x).unwrap();
        assert_eq!(previous.name(), "a");
        assert_eq!(ds.dim("x").unwrap().units, "um");
        assert_eq!(ds.axis_of("x"), Some(0));
        assert!(ds.dim("a").is_err());
    }

    #[test]
    fn binding_rejects_name_clashes() {
        let mut ds = sample();
        ds.set_attr("bias", 1.0).unwrap();
        let bias = Dimension::new("bias", vec![0.0; 10]).unwrap();
        assert!(matches!(
            ds.set_dimension(2, bias),
            Err(DatasetError::NameConflict(_))
        ));

        let dup = Dimension::new("b", vec![0.0; 4]).unwrap();
        assert!(matches!(
            ds.set_dimension(0, dup),
            Err(DatasetError::NameConflict(_))
        ));

        // Rebinding the same name on its own axis is fine.
        let c = Dimension::new("c", vec![1.0; 10]).unwrap();
        assert!(ds.set_dimension(2, c).is_ok());
        assert!(matches!(
            ds.rename_dimension(1, "quantity"),
            Err(DatasetError::ReservedName(_))
        ));
    }

    #[test]
    fn bound_dimension_is_mutable_by_name() {
        let mut ds = sample();
        ds.set_dimension(2, Dimension::new("bias", vec![0.0; 10]).unwrap())
            .unwrap();
        {
            let bias = ds.dim_mut("bias").unwrap();
            bias.dimension_type = DimensionType::Spectral;
            bias.units = "V".into();
            bias.quantity = "Bias".into();
        }
        assert_eq!(ds.spectral_dims(), vec![2]);
        assert_eq!(ds.dim("bias").unwrap().to_string(), "bias:  Bias (V) of size (10,)");
    }

    #[test]
    fn select_drops_and_slices_dimensions() {
        let mut ds = sample();
        ds.set_dimension(
            0,
            Dimension::new("x", vec![0.0, 1.0, 2.0, 3.0])
                .unwrap()
                .with_dimension_type(DimensionType::Spatial),
        )
        .unwrap();
        ds.set_attr("acquired", "nowhere").unwrap();

        let column = ds
            .select(&[AxisIndex::Full, 0.into(), 2.into()])
            .unwrap();
        assert_eq!(column.shape(), &[4]);
        assert_eq!(column.dimensions().len(), 1);
        assert_eq!(column.dimension(0).unwrap().name(), "x");
        assert_eq!(column.compute(), arr1(&[2.0, 102.0, 202.0, 302.0]).into_dyn());
        assert!(column.attr("acquired").is_some());

        let block = ds.select(&[(1..3).into(), AxisIndex::Full, AxisIndex::stepped(None, None, 5)]).unwrap();
        assert_eq!(block.shape(), &[2, 5, 2]);
        assert_eq!(block.dim("x").unwrap().values(), &[1.0, 2.0]);
        assert_eq!(block.dimension(2).unwrap().values(), &[0.0, 5.0]);
        // source is untouched
        assert_eq!(ds.shape(), &[4, 5, 10]);
    }

    #[test]
    fn display_lists_dimensions_and_attributes() {
        let mut ds = sample();
        ds.units = "nA".into();
        ds.quantity = "Current".into();
        ds.set_attr("acquired", "nowhere").unwrap();
        let text = ds.to_string();
        assert!(text.starts_with("Dataset 'random' of type generic with:"));
        assert!(text.contains("shape (4, 5, 10)"));
        assert!(text.contains("data contains: Current (nA)"));
        assert!(text.contains("a:  generic (generic) of size (4,)"));
        assert!(text.contains("with attributes: acquired"));
    }

    #[test]
    fn zero_extent_axis_takes_an_empty_dimension() {
        let mut ds = Dataset::from_array(ndarray::Array2::<f64>::zeros((0, 3)), "empty");
        assert!(ds.is_empty());
        ds.set_dimension(0, Dimension::new("time", Vec::<f64>::new()).unwrap())
            .unwrap();
        assert_eq!(ds.dim("time").unwrap().len(), 0);
        assert!(matches!(
            ds.set_dimension(1, Dimension::new("y", Vec::<f64>::new()).unwrap()),
            Err(DatasetError::DimensionLength { extent: 3, .. })
        ));
    }

    #[test]
    fn rebuilding_checks_dimension_count() {
        let err = sample()
            .with_dimensions(vec![Dimension::generic(0, 4), Dimension::generic(1, 5)])
            .unwrap_err();
        assert!(matches!(err, DatasetError::DimensionCount { rank: 3, found: 2 }));
    }

    #[test]
    fn replacing_attributes_drops_old_keys() {
        let mut ds = sample();
        ds.set_attr("acquired", "nowhere").unwrap();
        let mut table = Metadata::new();
        table.insert("operator".to_string(), MetadataValue::from("jd"));
        ds.replace_attributes(table).unwrap();
        assert!(ds.attr("acquired").is_none());
        assert_eq!(ds.attr("operator"), Some(&MetadataValue::from("jd")));
    }
}
