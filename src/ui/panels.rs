use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::Colormap;
use crate::data::model::Metadata;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – dataset summary
// ---------------------------------------------------------------------------

/// Render the left panel: structural attributes, dimensions, metadata.
pub fn side_panel(ui: &mut Ui, state: &ViewerState) {
    ui.heading("Dataset");
    ui.separator();

    let Some(ds) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("structure")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    let shape: Vec<String> = ds.shape().iter().map(|n| n.to_string()).collect();
                    let rows = [
                        ("name", ds.name.clone()),
                        ("title", ds.title.clone()),
                        ("data_type", ds.data_type.to_string()),
                        ("data", format!("{} ({})", ds.quantity, ds.units)),
                        ("shape", format!("({})", shape.join(", "))),
                        ("modality", ds.modality.clone()),
                        ("source", ds.source.clone()),
                    ];
                    for (key, value) in rows {
                        ui.strong(key);
                        ui.label(value);
                        ui.end_row();
                    }
                });

            ui.add_space(6.0);
            ui.strong("Dimensions");
            for (axis, dim) in ds.dimensions().iter().enumerate() {
                ui.label(format!("{axis}  {dim}  [{}]", dim.dimension_type));
            }

            ui.add_space(6.0);
            egui::CollapsingHeader::new(RichText::new("Attributes").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| metadata_table(ui, "attributes", ds.attributes()));

            if !ds.original_metadata.is_empty() {
                egui::CollapsingHeader::new(RichText::new("Original metadata").strong())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        metadata_table(ui, "original_metadata", &ds.original_metadata)
                    });
            }
        });
}

fn metadata_table(ui: &mut Ui, id: &str, metadata: &Metadata) {
    if metadata.is_empty() {
        ui.label("none");
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("key");
                });
                header.col(|ui| {
                    ui.strong("value");
                });
            })
            .body(|mut body| {
                for (key, value) in metadata {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(key);
                        });
                        row.col(|ui| {
                            ui.label(value.to_string());
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export PNG…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let current = state.colormap;
        egui::ComboBox::from_id_salt("colormap")
            .selected_text(current.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for cmap in Colormap::ALL {
                    if ui.selectable_label(current == cmap, cmap.to_string()).clicked() {
                        state.set_colormap(cmap);
                    }
                }
            });

        ui.separator();

        if let (Some(ds), Some(mode)) = (&state.dataset, state.mode) {
            ui.label(format!("{}: {} view", ds.name, mode));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["json", "parquet", "pq", "csv"])
        .add_filter("Dataset JSON", &["json"])
        .add_filter("Parquet spectra", &["parquet", "pq"])
        .add_filter("CSV spectra", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn export_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Export image")
        .add_filter("PNG", &["png"])
        .set_file_name("image.png")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_png(&path) {
            log::error!("Failed to export image: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
