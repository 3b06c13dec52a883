use egui::Pos2;

use crate::error::CanvasResult;
use crate::renderer;
use crate::style::Tool;
use crate::surface::RasterSurface;

/// Shows a candidate shape while the pointer drags, without committing it.
///
/// The scratch buffer holds the last committed pixels. Every redraw starts from
/// it, so previews never pile up on top of each other.
pub struct PreviewCompositor {
    scratch: RasterSurface,
    opacity: f32,
}

impl PreviewCompositor {
    pub fn new(width: u32, height: u32, opacity: f32) -> CanvasResult<Self> {
        Ok(Self {
            scratch: RasterSurface::new(width, height)?,
            opacity: opacity.clamp(0.0, 1.0),
        })
    }

    pub fn scratch(&self) -> &RasterSurface {
        &self.scratch
    }

    /// Capture the visible surface as the clean base for this drag
    pub fn begin(&mut self, visible: &RasterSurface) -> CanvasResult<()> {
        self.scratch.copy_from(visible)
    }

    /// Redraw the candidate shape translucently over the clean base
    pub fn update(&self, visible: &mut RasterSurface, tool: Tool, start: Pos2, current: Pos2) -> CanvasResult<()> {
        visible.copy_from(&self.scratch)?;

        visible.save();
        visible.set_global_alpha(self.opacity);
        renderer::paint_shape(visible, tool, start, current);
        visible.restore();
        Ok(())
    }

    /// Draw the final shape at full opacity over the clean base
    pub fn commit(&self, visible: &mut RasterSurface, tool: Tool, start: Pos2, end: Pos2) -> CanvasResult<()> {
        visible.copy_from(&self.scratch)?;
        renderer::paint_shape(visible, tool, start, end);
        Ok(())
    }

    /// Drop the in-flight preview, leaving only committed pixels visible
    pub fn abandon(&self, visible: &mut RasterSurface) -> CanvasResult<()> {
        visible.copy_from(&self.scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PaintStyle;
    use egui::{Color32, pos2};

    fn visible() -> RasterSurface {
        let mut surface = RasterSurface::new(32, 32).unwrap();
        surface.apply_style(&PaintStyle::derive(Color32::RED, 3, false));
        surface
    }

    #[test]
    fn test_preview_does_not_accumulate() {
        let mut surface = visible();
        let mut preview = PreviewCompositor::new(32, 32, 0.7).unwrap();
        preview.begin(&surface).unwrap();

        preview.update(&mut surface, Tool::Line, pos2(2.0, 2.0), pos2(30.0, 30.0)).unwrap();
        preview.update(&mut surface, Tool::Line, pos2(2.0, 2.0), pos2(30.0, 2.0)).unwrap();

        // The first candidate is gone, the second is translucent
        assert_eq!(surface.pixel(20, 20), Some([0, 0, 0, 0]));
        let pixel = surface.pixel(16, 2).unwrap();
        assert!(pixel[3] > 0 && pixel[3] < 255);
    }

    #[test]
    fn test_preview_restores_context() {
        let mut surface = visible();
        let before = *surface.context();
        let mut preview = PreviewCompositor::new(32, 32, 0.7).unwrap();
        preview.begin(&surface).unwrap();
        preview.update(&mut surface, Tool::Circle, pos2(16.0, 16.0), pos2(20.0, 16.0)).unwrap();
        assert_eq!(*surface.context(), before);
    }

    #[test]
    fn test_commit_is_opaque_and_abandon_restores() {
        let mut surface = visible();
        let mut preview = PreviewCompositor::new(32, 32, 0.7).unwrap();
        preview.begin(&surface).unwrap();
        preview.update(&mut surface, Tool::Rectangle, pos2(4.0, 4.0), pos2(20.0, 20.0)).unwrap();

        preview.abandon(&mut surface).unwrap();
        assert!(surface.pixels().pixels().all(|p| p.0[3] == 0));

        preview.commit(&mut surface, Tool::Rectangle, pos2(4.0, 4.0), pos2(20.0, 20.0)).unwrap();
        assert_eq!(surface.pixel(4, 10), Some([255, 0, 0, 255]));
    }
}
