use eframe::egui;

use crate::DoodleApp;
use crate::components::{Swatch, ToolButton};
use crate::style::{self, Tool};

pub fn control_panel(app: &mut DoodleApp, ctx: &egui::Context) {
    egui::SidePanel::left("control_panel")
        .resizable(false)
        .default_width(190.0)
        .show(ctx, |ui| {
            ui.heading("Doodle Canvas");
            ui.separator();

            ui.label("Tool");
            ui.horizontal(|ui| {
                let active = app.session().tool();
                for tool in Tool::ALL {
                    if ToolButton::new(tool, active == tool).show(ui).clicked() {
                        log::info!("Tool selected from UI: {}", tool.name());
                        app.session_mut().select_tool(tool);
                    }
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Custom colour:");
                let mut colour = app.session().colour();
                if egui::color_picker::color_edit_button_srgba(ui, &mut colour, egui::color_picker::Alpha::Opaque)
                    .changed()
                {
                    select_colour(app, &style::to_hex(colour));
                }
            });

            ui.label("Colours");
            let palette = app.session().config().palette.clone();
            let selected = style::to_hex(app.session().colour());
            ui.horizontal_wrapped(|ui| {
                for hex in &palette {
                    let Ok(colour) = style::parse_hex_colour(hex) else {
                        continue;
                    };
                    if Swatch::new(hex, colour, selected.eq_ignore_ascii_case(hex)).show(ui).clicked() {
                        select_colour(app, hex);
                    }
                }
            });
            ui.separator();

            ui.label("Brush size");
            let sizes = app.session().config().brush_sizes.clone();
            ui.horizontal_wrapped(|ui| {
                let current = app.session().brush_size();
                for size in sizes {
                    if ui.selectable_label(current == size, format!("{size}px")).clicked() {
                        app.session_mut().select_brush_size(size);
                    }
                }
            });

            let mut erasing = app.session().is_erasing();
            if ui.checkbox(&mut erasing, "Eraser").changed() {
                app.session_mut().toggle_eraser(erasing);
            }
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    app.session_mut().clear_canvas();
                }
                if ui.add_enabled(app.can_undo(), egui::Button::new("Undo")).clicked() {
                    app.session_mut().undo();
                }
            });
        });
}

fn select_colour(app: &mut DoodleApp, hex: &str) {
    if let Err(err) = app.session_mut().select_colour(hex) {
        log::warn!("Colour not applied: {}", err);
    }
}
