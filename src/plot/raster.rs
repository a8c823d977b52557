use std::path::Path;

use eframe::egui::{Color32, ColorImage};
use ndarray::Array2;

use crate::color::Colormap;
use crate::error::PlotError;

/// An RGBA rendering of a 2-D plane.
///
/// The plane is indexed `[x, y]`; pixel columns follow x and the highest y
/// index is drawn on the top row.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
    /// Data range mapped onto the colormap.
    pub range: (f64, f64),
}

impl Raster {
    pub fn from_plane(plane: &Array2<f64>, colormap: Colormap) -> Self {
        let (width, height) = plane.dim();
        let range = finite_range(plane.iter().copied());
        let (lo, hi) = range;
        let span = hi - lo;

        let mut rgba = Vec::with_capacity(width * height * 4);
        for row in 0..height {
            let y = height - 1 - row;
            for x in 0..width {
                let v = plane[[x, y]];
                if !v.is_finite() {
                    rgba.extend_from_slice(&[0, 0, 0, 0]);
                    continue;
                }
                let t = if span > 0.0 { (v - lo) / span } else { 0.5 };
                let c = colormap.color_at(t);
                rgba.extend_from_slice(&[c.r(), c.g(), c.b(), 255]);
            }
        }

        Self {
            width,
            height,
            rgba,
            range,
        }
    }

    pub fn pixel(&self, col: usize, row: usize) -> Option<Color32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let i = (row * self.width + col) * 4;
        Some(Color32::from_rgba_unmultiplied(
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ))
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied([self.width, self.height], &self.rgba)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), PlotError> {
        let image = image::RgbaImage::from_raw(self.width as u32, self.height as u32, self.rgba.clone())
            .ok_or_else(|| PlotError::Display("raster buffer does not match its size".into()))?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        log::info!("exported {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Min and max of the finite values, `(0, 0)` if there are none.
fn finite_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        (0.0, 0.0)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn highest_y_is_top_row() {
        // plane[[x, y]]
        let plane = arr2(&[[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]);
        let raster = Raster::from_plane(&plane, Colormap::Gray);
        assert_eq!((raster.width, raster.height), (3, 2));
        assert_eq!(raster.range, (0.0, 5.0));
        // top-left is x=0, y=1 -> value 1.0
        assert_eq!(raster.pixel(0, 0), Some(Colormap::Gray.color_at(0.2)));
        // bottom-left is the minimum
        assert_eq!(raster.pixel(0, 1), Some(Color32::from_rgb(0, 0, 0)));
        // top-right is the maximum
        assert_eq!(raster.pixel(2, 0), Some(Color32::from_rgb(255, 255, 255)));
        assert_eq!(raster.pixel(3, 0), None);
    }

    #[test]
    fn nan_is_transparent_and_constant_is_mid() {
        let plane = arr2(&[[f64::NAN, 2.0], [2.0, 2.0]]);
        let raster = Raster::from_plane(&plane, Colormap::Gray);
        assert_eq!(raster.pixel(0, 1), Some(Color32::from_rgba_unmultiplied(0, 0, 0, 0)));
        assert_eq!(raster.pixel(1, 1), Some(Colormap::Gray.color_at(0.5)));
    }

    #[test]
    fn png_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let raster = Raster::from_plane(&arr2(&[[0.0, 1.0], [2.0, 3.0]]), Colormap::Viridis);
        raster.save_png(&path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (2, 2));
        assert_eq!(back.into_raw(), raster.rgba);
    }
}
