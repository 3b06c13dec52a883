use egui::{Color32, ColorImage, Pos2, Rect};
use image::{Rgba, RgbaImage};

use crate::error::{CanvasError, CanvasResult};
use crate::style::{Composite, PaintStyle};

/// Drawing attributes consulted by every paint operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextState {
    pub stroke_colour: Color32,
    pub line_width: f32,
    pub composite: Composite,
    pub global_alpha: f32,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            stroke_colour: Color32::BLACK,
            line_width: 5.0,
            composite: Composite::SourceOver,
            global_alpha: 1.0,
        }
    }
}

/// Pixels covered by a single stroke, limited to the stroke's bounding box.
///
/// A mask is composited exactly once per covered pixel, so a translucent
/// stroke never darkens where its own geometry overlaps.
pub struct CoverageMask {
    min_x: u32,
    min_y: u32,
    width: u32,
    covered: Vec<bool>,
}

impl CoverageMask {
    /// Build a mask by testing the centre of every pixel inside `bounds`.
    ///
    /// Returns `None` when `bounds` lies entirely off the surface.
    pub fn from_fn(bounds: Rect, surface_size: [u32; 2], covers: impl Fn(Pos2) -> bool) -> Option<Self> {
        let [surface_w, surface_h] = surface_size;
        let min_x = bounds.min.x.floor().max(0.0);
        let min_y = bounds.min.y.floor().max(0.0);
        let max_x = bounds.max.x.ceil().min(surface_w as f32);
        let max_y = bounds.max.y.ceil().min(surface_h as f32);
        if !(min_x < max_x && min_y < max_y) {
            return None;
        }

        let (min_x, min_y) = (min_x as u32, min_y as u32);
        let width = max_x as u32 - min_x;
        let height = max_y as u32 - min_y;
        let mut covered = Vec::with_capacity(width as usize * height as usize);
        for y in min_y..min_y + height {
            for x in min_x..min_x + width {
                covered.push(covers(Pos2::new(x as f32 + 0.5, y as f32 + 0.5)));
            }
        }

        Some(Self { min_x, min_y, width, covered })
    }

    pub fn covered_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.covered.iter().enumerate().filter(|(_, c)| **c).map(|(i, _)| {
            let i = i as u32;
            (self.min_x + i % self.width, self.min_y + i / self.width)
        })
    }

}

/// A fixed-size RGBA pixel grid with a 2D drawing context
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    context: ContextState,
    saved: Vec<ContextState>,
    /// Bumped on every pixel mutation so viewers know when to re-upload
    generation: u64,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
            context: ContextState::default(),
            saved: Vec::new(),
            generation: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.pixels.get_pixel(x, y).0)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn context(&self) -> &ContextState {
        &self.context
    }

    /// Apply stroke colour, width and composite mode from a paint style
    pub fn apply_style(&mut self, style: &PaintStyle) {
        self.context.stroke_colour = style.stroke_colour();
        self.context.line_width = style.width as f32;
        self.context.composite = style.composite();
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.context.global_alpha = alpha.clamp(0.0, 1.0);
    }

    /// Push the current context so temporary changes can be rolled back
    pub fn save(&mut self) {
        self.saved.push(self.context);
    }

    pub fn restore(&mut self) {
        if let Some(context) = self.saved.pop() {
            self.context = context;
        }
    }

    /// Alpha-clear every pixel, ignoring the context
    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
        self.generation += 1;
    }

    /// Overwrite every pixel with the contents of another surface of the same size
    pub fn copy_from(&mut self, other: &RasterSurface) -> CanvasResult<()> {
        self.replace_pixels(other.pixels.clone())
    }

    /// Swap in a whole frame, e.g. one decoded from a history snapshot
    pub fn replace_pixels(&mut self, frame: RgbaImage) -> CanvasResult<()> {
        let actual = [frame.width(), frame.height()];
        if actual != self.size() {
            return Err(CanvasError::SizeMismatch {
                expected: self.size(),
                actual,
            });
        }
        self.pixels = frame;
        self.generation += 1;
        Ok(())
    }

    /// Composite the current stroke colour through a coverage mask
    pub fn fill_mask(&mut self, mask: &CoverageMask) {
        let [r, g, b, a] = self.context.stroke_colour.to_srgba_unmultiplied();
        let src_alpha = a as f32 / 255.0 * self.context.global_alpha;
        let src = [r as f32, g as f32, b as f32];
        let composite = self.context.composite;

        for (x, y) in mask.covered_pixels() {
            let dst = self.pixels.get_pixel_mut(x, y);
            dst.0 = match composite {
                Composite::SourceOver => source_over(src, src_alpha, dst.0),
                Composite::DestinationOut => destination_out(src_alpha, dst.0),
            };
        }
        self.generation += 1;
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixels.as_raw(),
        )
    }
}

fn source_over(src: [f32; 3], src_alpha: f32, dst: [u8; 4]) -> [u8; 4] {
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        return [0, 0, 0, 0];
    }
    let blend = |i: usize| {
        let value = (src[i] * src_alpha + dst[i] as f32 * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    [blend(0), blend(1), blend(2), (out_alpha * 255.0).round() as u8]
}

fn destination_out(src_alpha: f32, dst: [u8; 4]) -> [u8; 4] {
    let out_alpha = (dst[3] as f32 * (1.0 - src_alpha)).round() as u8;
    if out_alpha == 0 {
        [0, 0, 0, 0]
    } else {
        [dst[0], dst[1], dst[2], out_alpha]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mask(surface: &RasterSurface) -> CoverageMask {
        let bounds = Rect::from_min_max(Pos2::ZERO, Pos2::new(surface.width() as f32, surface.height() as f32));
        CoverageMask::from_fn(bounds, surface.size(), |_| true).unwrap()
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = RasterSurface::new(4, 3).unwrap();
        assert_eq!(surface.size(), [4, 3]);
        assert!(surface.pixels().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            RasterSurface::new(0, 10),
            Err(CanvasError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_source_over_and_destination_out() {
        let mut surface = RasterSurface::new(2, 2).unwrap();
        surface.apply_style(&PaintStyle::derive(Color32::RED, 1, false));
        let mask = full_mask(&surface);
        surface.fill_mask(&mask);
        assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));

        surface.apply_style(&PaintStyle::derive(Color32::RED, 1, true));
        surface.fill_mask(&mask);
        assert_eq!(surface.pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_global_alpha_blends_once() {
        let mut surface = RasterSurface::new(2, 2).unwrap();
        surface.apply_style(&PaintStyle::derive(Color32::BLUE, 1, false));
        surface.set_global_alpha(0.5);
        surface.fill_mask(&full_mask(&surface));
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 255, 128]));
    }

    #[test]
    fn test_save_restore_context() {
        let mut surface = RasterSurface::new(2, 2).unwrap();
        surface.save();
        surface.set_global_alpha(0.7);
        surface.apply_style(&PaintStyle::derive(Color32::GREEN, 12, true));
        surface.restore();
        assert_eq!(*surface.context(), ContextState::default());
    }

    #[test]
    fn test_replace_pixels_checks_size() {
        let mut surface = RasterSurface::new(4, 4).unwrap();
        let result = surface.replace_pixels(RgbaImage::new(2, 2));
        assert!(matches!(result, Err(CanvasError::SizeMismatch { .. })));
    }

    #[test]
    fn test_mask_off_surface_is_none() {
        let bounds = Rect::from_min_max(Pos2::new(-20.0, -20.0), Pos2::new(-5.0, -5.0));
        assert!(CoverageMask::from_fn(bounds, [10, 10], |_| true).is_none());
    }
}
