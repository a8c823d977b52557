use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray,
};
use arrow::datatypes::{DataType as ArrowType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::dataset::{DataType, Dataset};
use super::dimension::{Dimension, DimensionType, GENERIC};
use super::model::{Metadata, MetadataValue};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – a saved [`Dataset`] (object), or spectra records (array)
/// * `.parquet` – spectra table with `x` and `y` list columns
/// * `.csv`     – spectra table, `x` and `y` hold semicolon-separated floats
///
/// Spectra tables become a 2-D `line_plot_family` dataset; see
/// [`spectra_to_dataset`].
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();

    let mut dataset = match ext.as_str() {
        "json" => load_json(path, &name)?,
        "parquet" | "pq" => spectra_to_dataset(load_parquet(path)?, &name)?,
        "csv" => spectra_to_dataset(load_csv(path)?, &name)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    if dataset.source == GENERIC {
        dataset.source = path.display().to_string();
    }
    log::info!(
        "Loaded dataset '{}' with shape {:?} from {}",
        dataset.name,
        dataset.shape(),
        path.display()
    );
    Ok(dataset)
}

/// Write `dataset` as JSON. The data is materialized.
pub fn save_json(dataset: &Dataset, path: &Path) -> Result<()> {
    let text = to_json_string(dataset)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved dataset '{}' to {}", dataset.name, path.display());
    Ok(())
}

pub fn to_json_string(dataset: &Dataset) -> Result<String> {
    let file = DatasetFile::from_dataset(dataset);
    serde_json::to_string_pretty(&file).context("serializing dataset")
}

pub fn from_json_str(text: &str) -> Result<Dataset> {
    let file: DatasetFile = serde_json::from_str(text).context("parsing dataset JSON")?;
    file.into_dataset()
}

// ---------------------------------------------------------------------------
// Native dataset JSON
// ---------------------------------------------------------------------------

fn generic() -> String {
    GENERIC.to_string()
}

/// On-disk layout of a dataset. Values are row-major; NaN and infinities
/// are stored as the strings `"NaN"`, `"inf"` and `"-inf"`.
#[derive(Debug, Serialize, Deserialize)]
struct DatasetFile {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    data_type: DataType,
    #[serde(default = "generic")]
    units: String,
    #[serde(default = "generic")]
    quantity: String,
    #[serde(default = "generic")]
    modality: String,
    #[serde(default = "generic")]
    source: String,
    shape: Vec<usize>,
    #[serde(with = "super::float_repr::vec")]
    values: Vec<f64>,
    #[serde(default)]
    dimensions: Vec<Dimension>,
    #[serde(default)]
    attributes: Metadata,
    #[serde(default)]
    original_metadata: Metadata,
}

impl DatasetFile {
    fn from_dataset(ds: &Dataset) -> Self {
        Self {
            name: ds.name.clone(),
            title: Some(ds.title.clone()),
            data_type: ds.data_type,
            units: ds.units.clone(),
            quantity: ds.quantity.clone(),
            modality: ds.modality.clone(),
            source: ds.source.clone(),
            shape: ds.shape().to_vec(),
            values: ds.lazy().to_vec(),
            dimensions: ds.dimensions().to_vec(),
            attributes: ds.attributes().clone(),
            original_metadata: ds.original_metadata.clone(),
        }
    }

    fn into_dataset(self) -> Result<Dataset> {
        let mut ds = Dataset::from_shape_vec(&self.shape, self.values, self.name)
            .context("dataset values do not match its shape")?;
        if !self.dimensions.is_empty() {
            ds = ds
                .with_dimensions(self.dimensions)
                .context("invalid dimensions")?;
        }
        ds.replace_attributes(self.attributes)
            .context("invalid attributes")?;
        if let Some(title) = self.title {
            ds.title = title;
        }
        ds.data_type = self.data_type;
        ds.units = self.units;
        ds.quantity = self.quantity;
        ds.modality = self.modality;
        ds.source = self.source;
        ds.original_metadata = self.original_metadata;
        Ok(ds)
    }
}

fn load_json(path: &Path, name: &str) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    match root {
        JsonValue::Array(records) => spectra_to_dataset(json_records(&records)?, name),
        obj @ JsonValue::Object(_) => {
            let file: DatasetFile =
                serde_json::from_value(obj).context("parsing dataset JSON")?;
            file.into_dataset()
        }
        _ => bail!("Expected a JSON object (dataset) or array (spectra records)"),
    }
}

// ---------------------------------------------------------------------------
// Spectra tables
// ---------------------------------------------------------------------------

/// One row of a spectra table.
#[derive(Debug, Clone)]
pub struct SpectrumRow {
    /// Spectral axis (x).
    pub x: Vec<f64>,
    /// Intensity (y) – same length as `x`.
    pub y: Vec<f64>,
    /// Remaining columns: column_name → value.
    pub metadata: BTreeMap<String, MetadataValue>,
}

/// Stack spectra into a `[n_spectra, n_points]` dataset.
///
/// All rows must share the same x axis. Axis 0 is the `spectrum` index, axis
/// 1 the spectral `x` axis. Metadata columns are stored in
/// `original_metadata` as one list per column (null where a row lacks it),
/// or a numeric array when every row holds a number.
pub fn spectra_to_dataset(rows: Vec<SpectrumRow>, name: &str) -> Result<Dataset> {
    let first = rows.first().context("no spectra found")?;
    let x = first.x.clone();

    for (i, row) in rows.iter().enumerate() {
        if row.x.len() != row.y.len() {
            bail!("Row {i}: x has {} values but y has {}", row.x.len(), row.y.len());
        }
        let same_axis = row.x.len() == x.len()
            && row
                .x
                .iter()
                .zip(&x)
                .all(|(a, b)| (a - b).abs() <= 1e-9 * b.abs().max(1.0));
        if !same_axis {
            bail!("Row {i}: x axis differs from row 0; spectra must share one axis");
        }
    }

    let n = rows.len();
    let values: Vec<f64> = rows.iter().flat_map(|r| r.y.iter().copied()).collect();
    let mut ds = Dataset::from_shape_vec(&[n, x.len()], values, name)?;
    ds.data_type = DataType::LinePlotFamily;
    ds.quantity = "Intensity".to_string();
    ds.units = "a.u.".to_string();

    ds.set_dimension(
        0,
        Dimension::new("spectrum", (0..n).map(|i| i as f64).collect::<Vec<_>>())?,
    )?;
    ds.set_dimension(
        1,
        Dimension::new("x", x)?
            .with_quantity("Wavenumber")
            .with_dimension_type(DimensionType::Spectral),
    )?;

    let columns: BTreeSet<&String> = rows.iter().flat_map(|r| r.metadata.keys()).collect();
    for col in columns {
        let per_row = rows
            .iter()
            .map(|r| r.metadata.get(col).cloned().unwrap_or(MetadataValue::Null))
            .collect::<Vec<_>>();
        ds.original_metadata
            .insert(col.clone(), MetadataValue::from(per_row));
    }
    Ok(ds)
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "x": [4000.0, 3999.0], "y": [0.12, 0.14], "sample": "A" },
///   ...
/// ]
/// ```
fn json_records(records: &[JsonValue]) -> Result<Vec<SpectrumRow>> {
    let mut spectra = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let x = json_array_to_f64(obj.get("x"), i, "x")?;
        let y = json_array_to_f64(obj.get("y"), i, "y")?;

        let mut metadata = BTreeMap::new();
        for (key, val) in obj {
            if key == "x" || key == "y" {
                continue;
            }
            metadata.insert(key.clone(), json_to_metadata(val));
        }

        spectra.push(SpectrumRow { x, y, metadata });
    }

    Ok(spectra)
}

fn json_array_to_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("Row {row}: missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .with_context(|| format!("Row {row}, {col}[{j}]: not a number"))
        })
        .collect()
}

fn json_to_metadata(val: &JsonValue) -> MetadataValue {
    // Anything serde can't map onto MetadataValue is kept as its JSON text.
    serde_json::from_value(val.clone())
        .unwrap_or_else(|_| MetadataValue::String(val.to_string()))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names.
/// `x` and `y` columns contain semicolon-separated floats:
///   `"4000.0;3999.0;3998.0"`, `"0.12;0.14;0.11"`
/// All other columns are treated as metadata.
fn load_csv(path: &Path) -> Result<Vec<SpectrumRow>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let x_idx = headers
        .iter()
        .position(|h| h == "x")
        .context("CSV missing 'x' column")?;
    let y_idx = headers
        .iter()
        .position(|h| h == "y")
        .context("CSV missing 'y' column")?;

    let mut spectra = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let x = parse_semicolon_floats(record.get(x_idx).unwrap_or(""), row_no, "x")?;
        let y = parse_semicolon_floats(record.get(y_idx).unwrap_or(""), row_no, "y")?;

        let mut metadata = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if col_idx == x_idx || col_idx == y_idx {
                continue;
            }
            if let Some(col_name) = headers.get(col_idx) {
                metadata.insert(col_name.clone(), guess_metadata_type(value));
            }
        }

        spectra.push(SpectrumRow { x, y, metadata });
    }

    Ok(spectra)
}

fn parse_semicolon_floats(s: &str, row: usize, col: &str) -> Result<Vec<f64>> {
    s.split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim()
                .parse::<f64>()
                .with_context(|| format!("Row {row}, {col}[{j}]: '{tok}' is not a number"))
        })
        .collect()
}

fn guess_metadata_type(s: &str) -> MetadataValue {
    if s.is_empty() {
        return MetadataValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return MetadataValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return MetadataValue::Float(f);
    }
    if s == "true" || s == "false" {
        return MetadataValue::Bool(s == "true");
    }
    MetadataValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `x`: List<Float64> or LargeList<Float64>
/// - `y`: List<Float64> or LargeList<Float64>
/// - Any other columns are metadata (strings, ints, floats, bools)
fn load_parquet(path: &Path) -> Result<Vec<SpectrumRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut spectra = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let x_idx = schema
            .index_of("x")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'x' column"))?;
        let y_idx = schema
            .index_of("y")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'y' column"))?;

        let x_col = batch.column(x_idx);
        let y_col = batch.column(y_idx);

        let meta_cols: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != x_idx && *i != y_idx)
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        for row in 0..batch.num_rows() {
            let x = extract_f64_list(x_col, row)
                .with_context(|| format!("Row {row}: failed to read 'x'"))?;
            let y = extract_f64_list(y_col, row)
                .with_context(|| format!("Row {row}: failed to read 'y'"))?;

            let mut metadata = BTreeMap::new();
            for (col_idx, col_name) in &meta_cols {
                let value = extract_metadata_value(batch.column(*col_idx), row);
                metadata.insert(col_name.clone(), value);
            }

            spectra.push(SpectrumRow { x, y, metadata });
        }
    }

    Ok(spectra)
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        ArrowType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .context("expected ListArray")?
            .value(row),
        ArrowType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .context("expected LargeListArray")?
            .value(row),
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

/// Extract a single metadata value from an Arrow column at a given row.
fn extract_metadata_value(col: &Arc<dyn Array>, row: usize) -> MetadataValue {
    if col.is_null(row) {
        return MetadataValue::Null;
    }
    let value = match col.data_type() {
        ArrowType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| MetadataValue::String(s.value(row).to_string())),
        ArrowType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| MetadataValue::String(s.value(row).to_string())),
        ArrowType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| MetadataValue::Integer(a.value(row) as i64)),
        ArrowType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| MetadataValue::Integer(a.value(row))),
        ArrowType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| MetadataValue::Float(a.value(row) as f64)),
        ArrowType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| MetadataValue::Float(a.value(row))),
        ArrowType::Boolean => col
            .as_boolean_opt()
            .map(|a| MetadataValue::Bool(a.value(row))),
        _ => None,
    };
    value.unwrap_or_else(|| MetadataValue::String(format!("{:?}", col.data_type())))
}
