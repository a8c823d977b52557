use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Float64Builder, Int64Array, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ndarray::Array3;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusty_sid::data::loader;
use rusty_sid::{Dataset, Dimension, DimensionType};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// A 32 x 32 map of bias spectra whose peak drifts across the scan.
fn spectrum_image(rng: &mut StdRng) -> Result<Dataset> {
    let (nx, ny, nb) = (32, 32, 128);
    let bias: Vec<f64> = (0..nb)
        .map(|i| -1.0 + 2.0 * i as f64 / (nb - 1) as f64)
        .collect();

    let data = Array3::from_shape_fn((nx, ny, nb), |(i, j, k)| {
        let centre = -0.5 + (i + j) as f64 / (nx + ny) as f64;
        let width = 0.08 + 0.04 * (j as f64 / ny as f64);
        gaussian(bias[k], centre, width, 1.0) + gauss(rng, 0.0, 0.01)
    });

    let mut ds = Dataset::from_array(data, "sample_spectrum_image");
    ds.set_data_type("spectral_image")?;
    ds.units = "nA".to_string();
    ds.quantity = "Current".to_string();
    ds.modality = "scanning tunneling spectroscopy".to_string();

    let positions = |n: usize| (0..n).map(|i| i as f64 * 0.1).collect::<Vec<_>>();
    ds.set_dimension(
        0,
        Dimension::new("x", positions(nx))?
            .with_units("um")
            .with_quantity("Length")
            .with_dimension_type(DimensionType::Spatial),
    )?;
    ds.set_dimension(
        1,
        Dimension::new("y", positions(ny))?
            .with_units("um")
            .with_quantity("Length")
            .with_dimension_type(DimensionType::Spatial),
    )?;
    ds.set_dimension(
        2,
        Dimension::new("bias", bias)?
            .with_units("V")
            .with_quantity("Bias")
            .with_dimension_type(DimensionType::Spectral),
    )?;
    ds.set_attr("seed", 42)?;
    Ok(ds)
}

/// Spectra table in the layout `loader::load_file` imports.
fn write_spectra_table(path: &Path, rng: &mut StdRng) -> Result<usize> {
    // Wavenumbers: 4000 → 2002, step 2
    let wavenumbers: Vec<f64> = (0..1000).map(|i| 4000.0 - i as f64 * 2.0).collect();
    let samples = [
        ("Sample_A", [(3400.0, 80.0, 0.8), (2900.0, 40.0, 0.5), (2350.0, 30.0, 0.3)]),
        ("Sample_B", [(3200.0, 60.0, 0.6), (2800.0, 50.0, 0.7), (2500.0, 35.0, 0.4)]),
    ];
    let concentrations = [0.1, 0.5, 1.0, 2.0];

    let mut x_builder = ListBuilder::new(Float64Builder::new());
    let mut y_builder = ListBuilder::new(Float64Builder::new());
    let mut names = Vec::new();
    let mut concs = Vec::new();
    let mut ids = Vec::new();

    for (sample, peaks) in &samples {
        for &conc in &concentrations {
            for &wn in &wavenumbers {
                let signal: f64 = peaks
                    .iter()
                    .map(|&(mu, sigma, amp)| gaussian(wn, mu, sigma, amp * conc))
                    .sum();
                x_builder.values().append_value(wn);
                y_builder
                    .values()
                    .append_value(signal + gauss(rng, 0.0, 0.005 * conc));
            }
            x_builder.append(true);
            y_builder.append(true);
            names.push(*sample);
            concs.push(conc);
            ids.push(ids.len() as i64);
        }
    }

    let item = Arc::new(Field::new("item", DataType::Float64, true));
    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::List(item.clone()), false),
        Field::new("y", DataType::List(item), false),
        Field::new("sample", DataType::Utf8, false),
        Field::new("concentration", DataType::Float64, false),
        Field::new("measurement_id", DataType::Int64, false),
    ]));

    let rows = ids.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(x_builder.finish()),
            Arc::new(y_builder.finish()),
            Arc::new(StringArray::from(names)),
            Arc::new(Float64Array::from(concs)),
            Arc::new(Int64Array::from(ids)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(rows)
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = StdRng::seed_from_u64(42);

    let image_path = Path::new("sample_spectrum_image.json");
    let dataset = spectrum_image(&mut rng)?;
    loader::save_json(&dataset, image_path)?;
    println!("Wrote spectrum image {:?} to {}", dataset.shape(), image_path.display());

    let table_path = Path::new("sample_spectra.parquet");
    let rows = write_spectra_table(table_path, &mut rng)?;
    println!("Wrote {rows} spectra to {}", table_path.display());
    Ok(())
}
