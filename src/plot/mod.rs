//! Plot dispatch: pick a view from the dataset's `data_type` and the
//! `dimension_type` tags of its dimensions, then show it in a native window.

pub mod frame;
pub mod raster;

use std::fmt;

use crate::config::ViewerConfig;
use crate::data::dataset::{DataType, Dataset};
use crate::error::PlotError;

/// How a dataset is visualized. Axis numbers refer to the dataset's axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    /// One line against the axis' dimension values.
    Curve { axis: usize },
    /// One line per position along `family_axis`.
    CurveFamily {
        curve_axis: usize,
        family_axis: usize,
    },
    /// Static heat map; every other axis is integrated.
    Image { axes: [usize; 2] },
    /// Heat map with a frame slider along `stack_axis`.
    ImageStack { axes: [usize; 2], stack_axis: usize },
    /// Integrated image linked to the spectrum at the selected pixel.
    SpectralImage {
        image_axes: [usize; 2],
        spectral_axis: usize,
    },
    /// Scan image linked to the detector image at the selected scan position.
    FourDim {
        scan_axes: [usize; 2],
        detector_axes: [usize; 2],
    },
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlotMode::Curve { .. } => "curve",
            PlotMode::CurveFamily { .. } => "curve family",
            PlotMode::Image { .. } => "image",
            PlotMode::ImageStack { .. } => "image stack",
            PlotMode::SpectralImage { .. } => "spectral image",
            PlotMode::FourDim { .. } => "4-D image",
        };
        f.write_str(name)
    }
}

fn pair(axes: &[usize]) -> [usize; 2] {
    [axes[0], axes[1]]
}

/// Select the view for `dataset`. Depends only on `data_type`, the rank and
/// the dimension types.
pub fn select_mode(dataset: &Dataset) -> Result<PlotMode, PlotError> {
    let data_type = dataset.data_type;
    let ndim = dataset.ndim();
    let image_dims = dataset.image_dims();
    let spectral_dims = dataset.spectral_dims();

    let missing = |expected: &'static str, found: usize| PlotError::MissingDimensions {
        data_type,
        expected,
        found,
    };

    let mode = match (data_type, ndim) {
        (DataType::Unknown, _) => return Err(PlotError::Unplottable(data_type)),

        (DataType::Spectrum | DataType::LinePlot, 1) => PlotMode::Curve { axis: 0 },

        (DataType::Spectrum | DataType::LinePlot | DataType::LinePlotFamily, 2) => {
            let curve_axis = match spectral_dims.as_slice() {
                [axis] => *axis,
                _ => 1,
            };
            PlotMode::CurveFamily {
                curve_axis,
                family_axis: 1 - curve_axis,
            }
        }

        (DataType::Image | DataType::ImageMap, n) if n >= 2 => {
            if image_dims.len() >= 2 {
                PlotMode::Image {
                    axes: pair(&image_dims),
                }
            } else if n == 2 {
                PlotMode::Image { axes: [0, 1] }
            } else {
                return Err(missing("two spatial or reciprocal dimensions", image_dims.len()));
            }
        }

        (DataType::ImageStack, 3) => {
            let axes = if image_dims.len() == 2 {
                pair(&image_dims)
            } else if image_dims.is_empty() {
                [1, 2]
            } else {
                return Err(missing("two spatial or reciprocal dimensions", image_dims.len()));
            };
            let stack_axis = (0..3).find(|a| !axes.contains(a)).unwrap_or(0);
            PlotMode::ImageStack { axes, stack_axis }
        }

        (DataType::SpectralImage, 3) => {
            if image_dims.len() != 2 {
                return Err(missing("two spatial or reciprocal dimensions", image_dims.len()));
            }
            if spectral_dims.len() != 1 {
                return Err(missing("one spectral dimension", spectral_dims.len()));
            }
            PlotMode::SpectralImage {
                image_axes: pair(&image_dims),
                spectral_axis: spectral_dims[0],
            }
        }

        (DataType::Image4D, 4) => {
            let spatial = dataset.dimensions_of_type(crate::DimensionType::Spatial);
            if spatial.len() != 2 {
                return Err(missing("two spatial dimensions", spatial.len()));
            }
            let detector: Vec<usize> = (0..4).filter(|a| !spatial.contains(a)).collect();
            PlotMode::FourDim {
                scan_axes: pair(&spatial),
                detector_axes: pair(&detector),
            }
        }

        _ => return Err(PlotError::Unsupported { data_type, ndim }),
    };

    log::debug!(
        "dataset '{}' ({data_type}, rank {ndim}) plots as {mode}",
        dataset.name
    );
    Ok(mode)
}

impl Dataset {
    /// The view [`Dataset::plot`] would open.
    pub fn plot_mode(&self) -> Result<PlotMode, PlotError> {
        select_mode(self)
    }

    /// Show the dataset in a native window with the default configuration.
    /// Blocks until the window is closed.
    pub fn plot(&self) -> Result<(), PlotError> {
        self.plot_with(&ViewerConfig::default())
    }

    pub fn plot_with(&self, config: &ViewerConfig) -> Result<(), PlotError> {
        let mode = self.plot_mode()?;
        log::info!("plotting '{}' as {mode}", self.name);
        crate::app::run_viewer(self.clone(), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dimension::{Dimension, DimensionType};
    use ndarray::{Array1, Array2, Array3, Array4};

    fn tagged(ds: &mut Dataset, axis: usize, name: &str, t: DimensionType) {
        let len = ds.shape()[axis];
        let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
        ds.set_dimension(axis, Dimension::new(name, values).unwrap().with_dimension_type(t))
            .unwrap();
    }

    fn spectrum_image() -> Dataset {
        let mut ds = Dataset::from_array(Array3::<f64>::zeros((4, 5, 10)), "random");
        tagged(&mut ds, 0, "x", DimensionType::Spatial);
        tagged(&mut ds, 1, "y", DimensionType::Spatial);
        tagged(&mut ds, 2, "bias", DimensionType::Spectral);
        ds
    }

    #[test]
    fn generic_data_type_cannot_be_plotted() {
        let ds = spectrum_image();
        assert!(matches!(ds.plot_mode(), Err(PlotError::Unplottable(DataType::Unknown))));
    }

    #[test]
    fn spectrum_image_gives_linked_view() {
        let mut ds = spectrum_image();
        ds.set_data_type("spectrum_image").unwrap();
        assert_eq!(
            ds.plot_mode().unwrap(),
            PlotMode::SpectralImage {
                image_axes: [0, 1],
                spectral_axis: 2
            }
        );
    }

    #[test]
    fn image_data_type_gives_static_image() {
        let mut ds = spectrum_image();
        ds.data_type = DataType::Image;
        assert_eq!(ds.plot_mode().unwrap(), PlotMode::Image { axes: [0, 1] });
    }

    #[test]
    fn spectral_image_needs_tagged_dimensions() {
        let mut ds = Dataset::from_array(Array3::<f64>::zeros((4, 5, 10)), "plain");
        ds.data_type = DataType::SpectralImage;
        assert!(matches!(
            ds.plot_mode(),
            Err(PlotError::MissingDimensions { found: 0, .. })
        ));

        tagged(&mut ds, 0, "x", DimensionType::Spatial);
        tagged(&mut ds, 1, "y", DimensionType::Spatial);
        assert!(matches!(
            ds.plot_mode(),
            Err(PlotError::MissingDimensions {
                expected: "one spectral dimension",
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn untagged_2d_image_uses_first_axes() {
        let mut ds = Dataset::from_array(Array2::<f64>::zeros((3, 3)), "img");
        ds.data_type = DataType::Image;
        assert_eq!(ds.plot_mode().unwrap(), PlotMode::Image { axes: [0, 1] });
    }

    #[test]
    fn curves() {
        let mut line = Dataset::from_array(Array1::<f64>::zeros(8), "line");
        line.data_type = DataType::Spectrum;
        assert_eq!(line.plot_mode().unwrap(), PlotMode::Curve { axis: 0 });

        let mut family = Dataset::from_array(Array2::<f64>::zeros((6, 3)), "family");
        family.data_type = DataType::LinePlotFamily;
        tagged(&mut family, 0, "energy", DimensionType::Spectral);
        assert_eq!(
            family.plot_mode().unwrap(),
            PlotMode::CurveFamily {
                curve_axis: 0,
                family_axis: 1
            }
        );
    }

    #[test]
    fn image_stack_and_four_dim() {
        let mut stack = Dataset::from_array(Array3::<f64>::zeros((7, 4, 4)), "stack");
        stack.data_type = DataType::ImageStack;
        assert_eq!(
            stack.plot_mode().unwrap(),
            PlotMode::ImageStack {
                axes: [1, 2],
                stack_axis: 0
            }
        );

        let mut four = Dataset::from_array(Array4::<f64>::zeros((3, 3, 8, 8)), "4d");
        four.data_type = DataType::Image4D;
        tagged(&mut four, 0, "x", DimensionType::Spatial);
        tagged(&mut four, 1, "y", DimensionType::Spatial);
        tagged(&mut four, 2, "u", DimensionType::Reciprocal);
        tagged(&mut four, 3, "v", DimensionType::Reciprocal);
        assert_eq!(
            four.plot_mode().unwrap(),
            PlotMode::FourDim {
                scan_axes: [0, 1],
                detector_axes: [2, 3]
            }
        );
    }

    #[test]
    fn rank_mismatch_is_unsupported() {
        let mut ds = Dataset::from_array(Array1::<f64>::zeros(4), "line");
        ds.data_type = DataType::SpectralImage;
        assert!(matches!(
            ds.plot_mode(),
            Err(PlotError::Unsupported { ndim: 1, .. })
        ));
    }

    #[test]
    fn image_map_uses_tagged_axes() {
        let mut ds = Dataset::from_array(Array3::<f64>::zeros((6, 4, 5)), "map");
        ds.data_type = DataType::ImageMap;
        tagged(&mut ds, 1, "kx", DimensionType::Reciprocal);
        tagged(&mut ds, 2, "ky", DimensionType::Reciprocal);
        assert_eq!(ds.plot_mode().unwrap(), PlotMode::Image { axes: [1, 2] });
    }

    #[test]
    fn image_above_rank_two_needs_two_image_dims() {
        let mut ds = Dataset::from_array(Array3::<f64>::zeros((4, 5, 10)), "cube");
        ds.data_type = DataType::Image;
        tagged(&mut ds, 0, "x", DimensionType::Spatial);
        assert!(matches!(
            ds.plot_mode(),
            Err(PlotError::MissingDimensions {
                data_type: DataType::Image,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn image_stack_with_tagged_axes() {
        let mut stack = Dataset::from_array(Array3::<f64>::zeros((4, 7, 4)), "stack");
        stack.data_type = DataType::ImageStack;
        tagged(&mut stack, 0, "x", DimensionType::Spatial);
        assert!(matches!(
            stack.plot_mode(),
            Err(PlotError::MissingDimensions {
                data_type: DataType::ImageStack,
                found: 1,
                ..
            })
        ));

        tagged(&mut stack, 2, "y", DimensionType::Spatial);
        assert_eq!(
            stack.plot_mode().unwrap(),
            PlotMode::ImageStack {
                axes: [0, 2],
                stack_axis: 1
            }
        );
    }

    #[test]
    fn four_dim_needs_two_spatial_dims() {
        let mut four = Dataset::from_array(Array4::<f64>::zeros((3, 3, 8, 8)), "4d");
        four.data_type = DataType::Image4D;
        tagged(&mut four, 2, "u", DimensionType::Reciprocal);
        tagged(&mut four, 3, "v", DimensionType::Reciprocal);
        assert!(matches!(
            four.plot_mode(),
            Err(PlotError::MissingDimensions {
                expected: "two spatial dimensions",
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn untagged_spectrum_family_runs_along_last_axis() {
        let mut ds = Dataset::from_array(Array2::<f64>::zeros((3, 16)), "spectra");
        ds.data_type = DataType::Spectrum;
        assert_eq!(
            ds.plot_mode().unwrap(),
            PlotMode::CurveFamily {
                curve_axis: 1,
                family_axis: 0
            }
        );
    }
}
