use eframe::egui;

use crate::color::Colormap;

/// Window and rendering settings for [`Dataset::plot_with`](crate::Dataset::plot_with).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Window title; the dataset name is appended.
    pub title: String,
    pub inner_size: [f32; 2],
    pub min_inner_size: [f32; 2],
    pub colormap: Colormap,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Rusty SID – Dataset Viewer".to_string(),
            inner_size: [1200.0, 800.0],
            min_inner_size: [600.0, 400.0],
            colormap: Colormap::default(),
        }
    }
}

impl ViewerConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.inner_size = [width, height];
        self
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn window_title(&self, dataset_name: &str) -> String {
        format!("{} – {dataset_name}", self.title)
    }

    pub fn native_options(&self) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(self.inner_size)
                .with_min_inner_size(self.min_inner_size),
            ..Default::default()
        }
    }
}
