use eframe::egui;

use crate::config::ViewerConfig;
use crate::data::dataset::Dataset;
use crate::error::PlotError;
use crate::state::ViewerState;
use crate::ui::plot::TextureCache;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ViewerApp {
    pub state: ViewerState,
    textures: TextureCache,
}

impl ViewerApp {
    pub fn new(state: ViewerState) -> Self {
        Self {
            state,
            textures: TextureCache::default(),
        }
    }
}

impl Default for ViewerApp {
    fn default() -> Self {
        Self::new(ViewerState::default())
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: dataset summary and metadata ----
        egui::SidePanel::left("metadata_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: the dispatched view ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_view(ui, &mut self.state, &mut self.textures);
        });
    }
}

/// Open a native window showing `dataset`. Blocks until it is closed.
pub fn run_viewer(dataset: Dataset, config: &ViewerConfig) -> Result<(), PlotError> {
    let title = config.window_title(&dataset.name);
    let mut state = ViewerState::new(config.colormap);
    state.set_dataset(dataset);

    eframe::run_native(
        &title,
        config.native_options(),
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(state)))),
    )
    .map_err(|e| PlotError::Display(e.to_string()))
}
