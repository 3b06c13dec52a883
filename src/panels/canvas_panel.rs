use eframe::egui;

use crate::DoodleApp;
use crate::input::CanvasMetrics;

pub fn canvas_panel(app: &mut DoodleApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        // The surface is sized once the first layout pass gives us a canvas area
        app.ensure_surface();

        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
        let rect = response.rect;

        if let Some(backing_size) = app.session().surface().map(|s| s.size()) {
            let metrics = CanvasMetrics::new(rect, backing_size);
            let pointer_pos = ctx.input(|i| i.pointer.latest_pos());
            let button_down = response.is_pointer_button_down_on() && ctx.input(|i| i.pointer.primary_down());
            app.handle_canvas_input(pointer_pos, button_down, &metrics);
        }

        painter.rect_filled(rect, 8.0, egui::Color32::WHITE);
        if let Some(texture_id) = app.upload_texture(ctx) {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture_id, rect, uv, egui::Color32::WHITE);
        }
        painter.rect_stroke(rect, 8.0, egui::Stroke::new(2.0, egui::Color32::from_gray(0x33)));

        if response.hovered() {
            ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
        }
    });
}
