use eframe::egui;

/// A round colour button from the predefined palette
pub struct Swatch<'a> {
    pub hex: &'a str,
    pub colour: egui::Color32,
    pub selected: bool,
}

impl<'a> Swatch<'a> {
    pub fn new(hex: &'a str, colour: egui::Color32, selected: bool) -> Self {
        Self { hex, colour, selected }
    }

    pub fn show(&self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(egui::vec2(28.0, 28.0), egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let radius = rect.width() / 2.0 - 2.0;
            ui.painter().circle_filled(rect.center(), radius, self.colour);

            let border = if self.selected {
                egui::Stroke::new(3.0, egui::Color32::from_rgb(0x62, 0x62, 0xfc))
            } else {
                egui::Stroke::new(2.0, egui::Color32::from_gray(0xcc))
            };
            ui.painter().circle_stroke(rect.center(), radius, border);
        }

        response.on_hover_text(format!("Select colour {}", self.hex))
    }
}
