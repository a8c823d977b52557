use eframe::egui::{self, Color32, TextureHandle, TextureOptions, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotImage, PlotPoint, PlotPoints, Points};

use crate::color::generate_palette;
use crate::error::PlotError;
use crate::plot::raster::Raster;
use crate::plot::PlotMode;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Heat-map textures, re-uploaded when the state revision changes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TextureCache {
    revision: Option<u64>,
    main: Option<(TextureHandle, [usize; 2])>,
    detector: Option<(TextureHandle, [usize; 2])>,
}

impl TextureCache {
    fn refresh(&mut self, ctx: &egui::Context, state: &ViewerState) -> Result<(), PlotError> {
        if self.revision == Some(state.revision) {
            return Ok(());
        }
        self.main = state
            .main_raster()?
            .map(|r| upload(ctx, "main_image", &r));
        self.detector = state
            .detector_raster()?
            .map(|r| upload(ctx, "detector_image", &r));
        self.revision = Some(state.revision);
        Ok(())
    }
}

fn upload(ctx: &egui::Context, name: &str, raster: &Raster) -> (TextureHandle, [usize; 2]) {
    let texture = ctx.load_texture(name, raster.to_color_image(), TextureOptions::NEAREST);
    (texture, [raster.width, raster.height])
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the view chosen by plot dispatch.
pub fn central_view(ui: &mut Ui, state: &mut ViewerState, textures: &mut TextureCache) {
    let Some(mode) = state.mode else {
        ui.centered_and_justified(|ui: &mut Ui| {
            match &state.status_message {
                Some(msg) => ui.heading(msg),
                None => ui.heading("Open a dataset to view it  (File → Open…)"),
            };
        });
        return;
    };

    if let Err(e) = textures.refresh(ui.ctx(), state) {
        log::error!("Failed to render image: {e}");
        state.status_message = Some(format!("Error: {e}"));
        return;
    }

    if let Err(e) = draw(ui, mode, state, textures) {
        log::error!("Failed to draw view: {e}");
        state.status_message = Some(format!("Error: {e}"));
    }
}

fn draw(
    ui: &mut Ui,
    mode: PlotMode,
    state: &mut ViewerState,
    textures: &TextureCache,
) -> Result<(), PlotError> {
    match mode {
        PlotMode::Curve { axis } => {
            let points = state.spectrum()?.unwrap_or_default();
            let (x_label, y_label) = labels(state, axis);
            curve_plot(ui, "curve", vec![(String::new(), points)], x_label, y_label, false);
        }
        PlotMode::CurveFamily { curve_axis, .. } => {
            let curves = state.curves()?;
            let (x_label, y_label) = labels(state, curve_axis);
            curve_plot(ui, "curve_family", curves, x_label, y_label, true);
        }
        PlotMode::Image { axes } => {
            if let Some((texture, size)) = &textures.main {
                let (x_label, y_label) = image_labels(state, axes);
                image_plot(ui, "image", texture, *size, x_label, y_label, None);
            }
        }
        PlotMode::ImageStack { axes, .. } => {
            let len = state.stack_len();
            let mut frame = state.frame;
            if len > 1 {
                ui.add(egui::Slider::new(&mut frame, 0..=len - 1).text("frame"));
                state.set_frame(frame);
            }
            if let Some((texture, size)) = &textures.main {
                let (x_label, y_label) = image_labels(state, axes);
                image_plot(ui, "image_stack", texture, *size, x_label, y_label, None);
            }
        }
        PlotMode::SpectralImage {
            image_axes,
            spectral_axis,
        } => {
            let spectrum = state.spectrum()?.unwrap_or_default();
            let (x_label, y_label) = image_labels(state, image_axes);
            let (s_label, v_label) = labels(state, spectral_axis);
            let cursor = state.cursor;
            let mut clicked = None;
            ui.columns(2, |cols| {
                if let Some((texture, size)) = &textures.main {
                    clicked = image_plot(
                        &mut cols[0],
                        "spectral_image",
                        texture,
                        *size,
                        x_label,
                        y_label,
                        Some(cursor),
                    );
                }
                curve_plot(
                    &mut cols[1],
                    "spectrum",
                    vec![(format!("({}, {})", cursor[0], cursor[1]), spectrum)],
                    s_label,
                    v_label,
                    false,
                );
            });
            if let Some(point) = clicked {
                state.select_point(point);
            }
        }
        PlotMode::FourDim {
            scan_axes,
            detector_axes,
        } => {
            let (x_label, y_label) = image_labels(state, scan_axes);
            let (u_label, v_label) = image_labels(state, detector_axes);
            let cursor = state.cursor;
            let mut clicked = None;
            ui.columns(2, |cols| {
                if let Some((texture, size)) = &textures.main {
                    clicked = image_plot(
                        &mut cols[0],
                        "scan_image",
                        texture,
                        *size,
                        x_label,
                        y_label,
                        Some(cursor),
                    );
                }
                if let Some((texture, size)) = &textures.detector {
                    image_plot(&mut cols[1], "detector_image", texture, *size, u_label, v_label, None);
                }
            });
            if let Some(point) = clicked {
                state.select_point(point);
            }
        }
    }
    Ok(())
}

/// Axis labels for a curve along `axis`: the dimension and the data quantity.
fn labels(state: &ViewerState, axis: usize) -> (String, String) {
    let Some(ds) = &state.dataset else {
        return (String::new(), String::new());
    };
    let x = ds
        .dimension(axis)
        .map(|d| d.label())
        .unwrap_or_default();
    (x, format!("{} ({})", ds.quantity, ds.units))
}

fn image_labels(state: &ViewerState, axes: [usize; 2]) -> (String, String) {
    let Some(ds) = &state.dataset else {
        return (String::new(), String::new());
    };
    let label = |axis: usize| {
        ds.dimension(axis)
            .map(|d| format!("{} [px]", d.name()))
            .unwrap_or_default()
    };
    (label(axes[0]), label(axes[1]))
}

fn curve_plot(
    ui: &mut Ui,
    id: &str,
    curves: Vec<(String, Vec<[f64; 2]>)>,
    x_label: String,
    y_label: String,
    legend: bool,
) {
    let colors = generate_palette(curves.len());
    let mut plot = Plot::new(id)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if legend {
        plot = plot.legend(Legend::default());
    }
    plot.show(ui, |plot_ui| {
        for ((name, points), color) in curves.into_iter().zip(colors) {
            let color = if legend { color } else { Color32::LIGHT_BLUE };
            let line = Line::new(PlotPoints::from(points))
                .name(name)
                .color(color)
                .width(1.5);
            plot_ui.line(line);
        }
    });
}

/// Heat map in plot coordinates (one unit per pixel). Returns the clicked
/// plot coordinate, if any.
fn image_plot(
    ui: &mut Ui,
    id: &str,
    texture: &TextureHandle,
    size: [usize; 2],
    x_label: String,
    y_label: String,
    cursor: Option<[usize; 2]>,
) -> Option<[f64; 2]> {
    let [w, h] = size;
    let response = Plot::new(id)
        .data_aspect(1.0)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.image(PlotImage::new(
                texture.id(),
                PlotPoint::new(w as f64 / 2.0, h as f64 / 2.0),
                egui::vec2(w as f32, h as f32),
            ));
            if let Some([cx, cy]) = cursor {
                plot_ui.points(
                    Points::new(vec![[cx as f64 + 0.5, cy as f64 + 0.5]])
                        .shape(MarkerShape::Cross)
                        .radius(6.0)
                        .color(Color32::RED),
                );
            }
            plot_ui.pointer_coordinate()
        });

    if response.response.clicked() {
        response.inner.map(|p| [p.x, p.y])
    } else {
        None
    }
}
