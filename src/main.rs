use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ndarray::{Array, Array1, Array3};
use rand::Rng;
use rusty_sid::data::loader;
use rusty_sid::{AxisIndex, DataType, Dataset, Dimension, DimensionType, MetadataValue};

fn main() -> Result<()> {
    env_logger::init();

    // `rusty-sid <file>` opens a saved dataset or spectra table instead.
    if let Some(path) = std::env::args().nth(1).map(PathBuf::from) {
        let dataset = loader::load_file(&path)
            .with_context(|| format!("loading {}", path.display()))?;
        println!("{dataset}");
        dataset.plot()?;
        return Ok(());
    }

    walkthrough()
}

/// Build, annotate and plot a small spectral image.
fn walkthrough() -> Result<()> {
    println!("rusty-sid {}", env!("CARGO_PKG_VERSION"));

    // ---- Creating a dataset from any array ----
    let mut rng = rand::thread_rng();
    let data = Array3::from_shape_simple_fn((4, 5, 10), || rng.gen::<f64>());
    let mut data_set = Dataset::from_array(data, "random");
    println!("{data_set}");

    // ---- Indexing works like numpy; compute() materializes ----
    let column = data_set.select(&[AxisIndex::Full, 0.into(), 2.into()])?;
    println!("{}", column.compute());

    // ---- Top-level metadata ----
    data_set.set_data_type("spectrum_image")?;
    data_set.units = "nA".to_string();
    data_set.quantity = "Current".to_string();

    // ---- Scientific metadata ----
    let counting: Array1<f64> = Array::range(0.0, 5.0, 1.0);
    data_set.set_attr("counting", counting)?;
    let mut something = BTreeMap::new();
    something.insert("nothing".to_string(), MetadataValue::from(" "));
    something.insert("value".to_string(), MetadataValue::from(6.8));
    data_set.set_attr("something", something)?;
    data_set.set_attr("acquired", "nowhere")?;

    if let Some(counting) = data_set.attr("counting") {
        println!("{counting}");
    }
    if let Some(something) = data_set.attr("something") {
        println!("{something}");
    }

    // ---- Dimensions ----
    let shape = data_set.shape().to_vec();
    data_set.set_dimension(
        0,
        Dimension::new("x", Array::range(0.0, shape[0] as f64, 1.0).to_vec())?
            .with_units("um")
            .with_quantity("Length")
            .with_dimension_type(DimensionType::Spatial),
    )?;
    data_set.set_dimension(
        1,
        Dimension::new("y", Array::linspace(-2.0, 2.0, shape[1]).to_vec())?
            .with_units("um")
            .with_quantity("Length")
            .with_dimension_type(DimensionType::Spatial),
    )?;
    let bias: Vec<f64> = Array::linspace(0.0, 2.0 * PI, shape[2])
        .iter()
        .map(|v| v.sin())
        .collect();
    data_set.set_dimension(2, Dimension::new("bias", bias)?)?;

    // A bound dimension stays editable by name.
    {
        let bias = data_set.dim_mut("bias")?;
        bias.dimension_type = DimensionType::Spectral;
        bias.units = "V".to_string();
        bias.quantity = "Bias".to_string();
    }

    println!("{}", data_set.dim("bias")?);
    println!("{data_set}");

    // ---- Plotting: spatial + spectral dimensions give the linked view ----
    data_set.plot()?;

    // ---- The same data as a plain image ----
    data_set.data_type = DataType::Image;
    data_set.plot()?;

    Ok(())
}
