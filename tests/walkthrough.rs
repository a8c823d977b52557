//! Replays the dataset walkthrough without opening a window.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::f64::consts::PI;

use ndarray::{Array, Array3};
use rusty_sid::data::loader;
use rusty_sid::state::ViewerState;
use rusty_sid::{
    AxisIndex, DataType, Dataset, DatasetError, Dimension, DimensionType, MetadataValue, PlotMode,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn random_dataset() -> Dataset {
    let data = Array3::from_shape_fn((4, 5, 10), |(i, j, k)| ((i * 7 + j * 3 + k) % 11) as f64 / 11.0);
    Dataset::from_array(data, "random")
}

fn annotate(ds: &mut Dataset) -> Result<(), DatasetError> {
    ds.set_data_type("spectrum_image")?;
    ds.units = "nA".into();
    ds.quantity = "Current".into();

    ds.set_attr("counting", Array::range(0.0, 5.0, 1.0))?;
    ds.set_attr(
        "something",
        [("nothing", MetadataValue::from(" ")), ("value", 6.8.into())],
    )?;
    ds.set_attr("acquired", "nowhere")?;

    let shape = ds.shape().to_vec();
    ds.set_dimension(
        0,
        Dimension::new("x", Array::range(0.0, shape[0] as f64, 1.0).to_vec())?
            .with_units("um")
            .with_quantity("Length")
            .with_dimension_type(DimensionType::Spatial),
    )?;
    ds.set_dimension(
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
    ds.set_dimension(2, Dimension::new("bias", bias)?)?;

    let bias = ds.dim_mut("bias")?;
    bias.dimension_type = DimensionType::Spectral;
    bias.units = "V".into();
    bias.quantity = "Bias".into();
    Ok(())
}

#[test]
fn generic_defaults_before_annotation() {
    let ds = random_dataset();
    assert_eq!(ds.data_type, DataType::Unknown);
    assert_eq!(ds.units, "generic");
    assert_eq!(ds.quantity, "generic");
    assert!(ds.plot_mode().is_err());
}

#[test]
fn indexing_before_materializing() -> TestResult {
    let ds = random_dataset();
    let column = ds.select(&[AxisIndex::Full, 0.into(), 2.into()])?;
    assert_eq!(column.shape(), &[4]);
    assert_eq!(column.lazy().pending(), 2);

    let full = ds.compute();
    let values = column.compute();
    for i in 0..4 {
        assert_eq!(values[[i]], full[[i, 0, 2]]);
    }
    Ok(())
}

#[test]
fn annotated_dataset_dispatches_both_views() -> TestResult {
    let mut ds = random_dataset();
    annotate(&mut ds)?;

    assert_eq!(ds.attr("counting").unwrap().to_string(), "[0, 1, 2, 3, 4]");
    assert_eq!(
        ds.attr("something").unwrap().to_string(),
        "{nothing: \" \", value: 6.8}"
    );
    assert_eq!(ds.dim("bias")?.to_string(), "bias:  Bias (V) of size (10,)");
    assert_eq!(ds.dim("y")?.values()[4], 2.0);

    assert_eq!(
        ds.plot_mode()?,
        PlotMode::SpectralImage {
            image_axes: [0, 1],
            spectral_axis: 2
        }
    );

    ds.data_type = DataType::Image;
    assert_eq!(ds.plot_mode()?, PlotMode::Image { axes: [0, 1] });
    Ok(())
}

#[test]
fn linked_view_follows_clicks() -> TestResult {
    let mut ds = random_dataset();
    annotate(&mut ds)?;
    let full = ds.compute();

    let mut state = ViewerState::default();
    state.set_dataset(ds);
    state.select_point([3.5, 4.2]);
    let spectrum = state.spectrum()?.expect("spectral image has a spectrum");
    assert_eq!(spectrum.len(), 10);
    for (k, [_, v]) in spectrum.iter().enumerate() {
        assert_eq!(*v, full[[3, 4, k]]);
    }
    Ok(())
}

#[test]
fn dimension_length_mismatch_is_rejected() {
    let mut ds = random_dataset();
    let err = ds
        .set_dimension(1, Dimension::new("y", vec![0.0; 4]).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        DatasetError::DimensionLength {
            len: 4,
            axis: 1,
            extent: 5,
            ..
        }
    ));
}

#[test]
fn saved_dataset_plots_the_same() -> TestResult {
    let mut ds = random_dataset();
    annotate(&mut ds)?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("random.json");
    loader::save_json(&ds, &path)?;

    let back = loader::load_file(&path)?;
    assert_eq!(back.plot_mode()?, ds.plot_mode()?);
    assert_eq!(back.attributes(), ds.attributes());
    assert_eq!(back.compute(), ds.compute());
    Ok(())
}
