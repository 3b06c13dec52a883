use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, CanvasResult};

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 20;

/// The drawing tools offered by the control panel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Brush,
    Line,
    Rectangle,
    Circle,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Brush, Tool::Line, Tool::Rectangle, Tool::Circle];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
        }
    }

    /// Shape tools draw a previewed candidate instead of painting directly
    pub fn is_shape(&self) -> bool {
        !matches!(self, Tool::Brush)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaintMode {
    #[default]
    Normal,
    Erase,
}

/// How new pixels combine with what is already on the surface
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Deposit colour on top of existing pixels
    #[default]
    SourceOver,
    /// Remove existing pixels where the source is opaque
    DestinationOut,
}

/// Stroke attributes derived from the selected colour, brush size and eraser flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub colour: Color32,
    pub width: u32,
    pub mode: PaintMode,
}

impl PaintStyle {
    pub fn derive(colour: Color32, width: u32, erasing: bool) -> Self {
        Self {
            colour,
            width: width.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            mode: if erasing { PaintMode::Erase } else { PaintMode::Normal },
        }
    }

    /// The colour actually stroked; erasing ignores the selected colour
    pub fn stroke_colour(&self) -> Color32 {
        match self.mode {
            PaintMode::Normal => self.colour,
            PaintMode::Erase => Color32::BLACK,
        }
    }

    pub fn composite(&self) -> Composite {
        match self.mode {
            PaintMode::Normal => Composite::SourceOver,
            PaintMode::Erase => Composite::DestinationOut,
        }
    }
}

/// Parse `#rgb` or `#rrggbb` into an opaque colour
pub fn parse_hex_colour(hex: &str) -> CanvasResult<Color32> {
    let invalid = || CanvasError::InvalidColour(hex.to_string());
    let digits = hex.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match digits.len() {
        3 => {
            let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
            Ok(Color32::from_rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Ok(Color32::from_rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        _ => Err(invalid()),
    }
}

pub fn to_hex(colour: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", colour.r(), colour.g(), colour.b())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colour() {
        assert_eq!(parse_hex_colour("#b10909").unwrap(), Color32::from_rgb(0xb1, 0x09, 0x09));
        assert_eq!(parse_hex_colour("#FFF").unwrap(), Color32::WHITE);
        assert_eq!(to_hex(parse_hex_colour("#1E1E1E").unwrap()), "#1e1e1e");
    }

    #[test]
    fn test_parse_hex_colour_rejects_garbage() {
        for bad in ["", "b10909", "#12", "#12345", "#gg0000", "#1234567"] {
            assert!(parse_hex_colour(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_erase_style_ignores_colour() {
        let style = PaintStyle::derive(Color32::RED, 8, true);
        assert_eq!(style.mode, PaintMode::Erase);
        assert_eq!(style.composite(), Composite::DestinationOut);
        assert_eq!(style.stroke_colour(), Color32::BLACK);
    }

    #[test]
    fn test_width_is_clamped() {
        assert_eq!(PaintStyle::derive(Color32::RED, 0, false).width, MIN_BRUSH_SIZE);
        assert_eq!(PaintStyle::derive(Color32::RED, 99, false).width, MAX_BRUSH_SIZE);
    }
}
