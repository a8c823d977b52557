use std::path::Path;

use ndarray::{Array2, ArrayD};

use crate::color::Colormap;
use crate::data::dataset::Dataset;
use crate::error::PlotError;
use crate::plot::frame::{line, plane};
use crate::plot::raster::Raster;
use crate::plot::{select_mode, PlotMode};

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// Shown dataset (None until one is set or loaded).
    pub dataset: Option<Dataset>,

    /// Materialized data of `dataset`.
    data: Option<ArrayD<f64>>,

    /// View chosen by plot dispatch; None if the dataset cannot be plotted.
    pub mode: Option<PlotMode>,

    /// Selected position on the image axes (linked views).
    pub cursor: [usize; 2],

    /// Frame index along the stack axis.
    pub frame: usize,

    /// Active colour map for heat maps.
    pub colormap: Colormap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Bumped whenever a heat map has to be re-rendered.
    pub revision: u64,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            dataset: None,
            data: None,
            mode: None,
            cursor: [0, 0],
            frame: 0,
            colormap: Colormap::default(),
            status_message: None,
            revision: 0,
        }
    }
}

impl ViewerState {
    pub fn new(colormap: Colormap) -> Self {
        Self {
            colormap,
            ..Self::default()
        }
    }

    /// Show a dataset: dispatch the view and materialize the data.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        match select_mode(&dataset) {
            Ok(mode) => {
                self.mode = Some(mode);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("dataset '{}' cannot be plotted: {e}", dataset.name);
                self.mode = None;
                self.status_message = Some(format!("Cannot plot: {e}"));
            }
        }
        self.data = Some(dataset.compute());
        self.dataset = Some(dataset);
        self.cursor = [0, 0];
        self.frame = 0;
        self.revision += 1;
    }

    fn extent(&self, axis: usize) -> usize {
        self.data
            .as_ref()
            .and_then(|d| d.shape().get(axis).copied())
            .unwrap_or(0)
    }

    /// Axes the cursor moves on, if the view is a linked one.
    fn cursor_axes(&self) -> Option<[usize; 2]> {
        match self.mode? {
            PlotMode::SpectralImage { image_axes, .. } => Some(image_axes),
            PlotMode::FourDim { scan_axes, .. } => Some(scan_axes),
            _ => None,
        }
    }

    /// Move the cursor to pixel `(x, y)`, clamped to the image.
    pub fn select_pixel(&mut self, x: usize, y: usize) {
        let Some(axes) = self.cursor_axes() else {
            return;
        };
        let cx = x.min(self.extent(axes[0]).saturating_sub(1));
        let cy = y.min(self.extent(axes[1]).saturating_sub(1));
        if self.cursor != [cx, cy] {
            self.cursor = [cx, cy];
            self.revision += 1;
        }
    }

    /// Move the cursor to the pixel containing plot coordinate `point`.
    /// Points outside the image are ignored.
    pub fn select_point(&mut self, point: [f64; 2]) {
        let Some(axes) = self.cursor_axes() else {
            return;
        };
        let [px, py] = point;
        if px < 0.0 || py < 0.0 {
            return;
        }
        let (x, y) = (px.floor() as usize, py.floor() as usize);
        if x < self.extent(axes[0]) && y < self.extent(axes[1]) {
            self.select_pixel(x, y);
        }
    }

    pub fn stack_len(&self) -> usize {
        match self.mode {
            Some(PlotMode::ImageStack { stack_axis, .. }) => self.extent(stack_axis),
            _ => 0,
        }
    }

    pub fn set_frame(&mut self, frame: usize) {
        let frame = frame.min(self.stack_len().saturating_sub(1));
        if frame != self.frame {
            self.frame = frame;
            self.revision += 1;
        }
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        if colormap != self.colormap {
            self.colormap = colormap;
            self.revision += 1;
        }
    }

    // -- View data --

    /// The primary heat map of the current view.
    pub fn main_plane(&self) -> Result<Option<Array2<f64>>, PlotError> {
        let (Some(data), Some(mode)) = (&self.data, self.mode) else {
            return Ok(None);
        };
        let plane = match mode {
            PlotMode::Image { axes } => plane(data, axes, &[])?,
            PlotMode::ImageStack { axes, stack_axis } => {
                plane(data, axes, &[(stack_axis, self.frame)])?
            }
            PlotMode::SpectralImage { image_axes, .. } => plane(data, image_axes, &[])?,
            PlotMode::FourDim { scan_axes, .. } => plane(data, scan_axes, &[])?,
            PlotMode::Curve { .. } | PlotMode::CurveFamily { .. } => return Ok(None),
        };
        Ok(Some(plane))
    }

    /// Detector image at the cursor (4-D view only).
    pub fn detector_plane(&self) -> Result<Option<Array2<f64>>, PlotError> {
        let (Some(data), Some(PlotMode::FourDim { scan_axes, detector_axes })) =
            (&self.data, self.mode)
        else {
            return Ok(None);
        };
        let fixed = [(scan_axes[0], self.cursor[0]), (scan_axes[1], self.cursor[1])];
        Ok(Some(plane(data, detector_axes, &fixed)?))
    }

    pub fn main_raster(&self) -> Result<Option<Raster>, PlotError> {
        Ok(self
            .main_plane()?
            .map(|p| Raster::from_plane(&p, self.colormap)))
    }

    pub fn detector_raster(&self) -> Result<Option<Raster>, PlotError> {
        Ok(self
            .detector_plane()?
            .map(|p| Raster::from_plane(&p, self.colormap)))
    }

    /// Single curve: the whole line, or the spectrum under the cursor.
    pub fn spectrum(&self) -> Result<Option<Vec<[f64; 2]>>, PlotError> {
        let (Some(data), Some(ds), Some(mode)) = (&self.data, &self.dataset, self.mode) else {
            return Ok(None);
        };
        let (axis, profile) = match mode {
            PlotMode::Curve { axis } => (axis, line(data, axis, &[])?),
            PlotMode::SpectralImage {
                image_axes,
                spectral_axis,
            } => {
                let fixed = [
                    (image_axes[0], self.cursor[0]),
                    (image_axes[1], self.cursor[1]),
                ];
                (spectral_axis, line(data, spectral_axis, &fixed)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(with_coordinates(ds, axis, profile.iter().copied())))
    }

    /// One named curve per position along the family axis.
    pub fn curves(&self) -> Result<Vec<(String, Vec<[f64; 2]>)>, PlotError> {
        let (Some(data), Some(ds), Some(PlotMode::CurveFamily { curve_axis, family_axis })) =
            (&self.data, &self.dataset, self.mode)
        else {
            return Ok(Vec::new());
        };
        let family = ds.dimension(family_axis);
        (0..self.extent(family_axis))
            .map(|i| -> Result<(String, Vec<[f64; 2]>), PlotError> {
                let profile = line(data, curve_axis, &[(family_axis, i)])?;
                let name = match family {
                    Some(dim) => format!("{} = {}", dim.name(), dim.values()[i]),
                    None => format!("curve {i}"),
                };
                Ok((name, with_coordinates(ds, curve_axis, profile.iter().copied())))
            })
            .collect()
    }

    /// Write the primary heat map to a PNG file.
    pub fn export_png(&self, path: &Path) -> Result<(), PlotError> {
        match self.main_raster()? {
            Some(raster) => raster.save_png(path),
            None => Err(PlotError::Display(
                "the current view has no image to export".into(),
            )),
        }
    }
}

/// Pair values with the dimension's coordinates, falling back to indices.
fn with_coordinates(ds: &Dataset, axis: usize, values: impl Iterator<Item = f64>) -> Vec<[f64; 2]> {
    let coords = ds.dimension(axis).map(|d| d.values());
    values
        .enumerate()
        .map(|(i, v)| {
            let x = coords.and_then(|c| c.get(i).copied()).unwrap_or(i as f64);
            [x, v]
        })
        .collect()
}
