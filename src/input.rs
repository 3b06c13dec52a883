use egui::{Pos2, Rect, pos2};

/// Where the canvas is drawn on screen and how many pixels back it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMetrics {
    /// The canvas widget's on-screen rectangle in points
    pub display_rect: Rect,
    /// Backing-store resolution of the raster surface
    pub backing_size: [u32; 2],
}

impl CanvasMetrics {
    pub fn new(display_rect: Rect, backing_size: [u32; 2]) -> Self {
        Self {
            display_rect,
            backing_size,
        }
    }

    /// Map a screen position to canvas pixel coordinates.
    ///
    /// Each axis is scaled independently by backing size / displayed size, so
    /// drawing stays under the pointer when the widget is stretched.
    pub fn to_canvas(&self, pos: Pos2) -> Pos2 {
        let size = self.display_rect.size();
        let scale = |backing: u32, shown: f32| if shown > 0.0 { backing as f32 / shown } else { 1.0 };
        pos2(
            (pos.x - self.display_rect.min.x) * scale(self.backing_size[0], size.x),
            (pos.y - self.display_rect.min.y) * scale(self.backing_size[1], size.y),
        )
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.display_rect.contains(pos)
    }
}

/// Pointer input for the drawing session, already in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up(Pos2),
    /// The pointer left the canvas; no final coordinate is available
    Leave,
}

/// Turns per-frame egui pointer state for the canvas widget into `PointerEvent`s
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Last screen position reported while a press is being tracked
    last_pointer_pos: Option<Pos2>,
    pressed: bool,
    /// Set after a leave until the button is released
    awaiting_release: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.pressed
    }

    /// `button_down` should be true while the primary button is held on the canvas.
    pub fn process(&mut self, pointer_pos: Option<Pos2>, button_down: bool, metrics: &CanvasMetrics) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        if self.awaiting_release {
            self.awaiting_release = button_down;
            return events;
        }

        if !self.pressed {
            if let (true, Some(pos)) = (button_down, pointer_pos) {
                if metrics.contains(pos) {
                    events.push(PointerEvent::Down(metrics.to_canvas(pos)));
                    self.pressed = true;
                    self.last_pointer_pos = Some(pos);
                }
            }
            return events;
        }

        let pos = pointer_pos.or(self.last_pointer_pos);
        match pos {
            // Leaving ends the press; re-entering with the button held does not resume it
            Some(pos) if !metrics.contains(pos) => {
                events.push(PointerEvent::Leave);
                self.reset();
                self.awaiting_release = button_down;
            }
            None => {
                events.push(PointerEvent::Leave);
                self.reset();
                self.awaiting_release = button_down;
            }
            Some(pos) => {
                if Some(pos) != self.last_pointer_pos {
                    events.push(PointerEvent::Move(metrics.to_canvas(pos)));
                    self.last_pointer_pos = Some(pos);
                }
                if !button_down {
                    events.push(PointerEvent::Up(metrics.to_canvas(pos)));
                    self.reset();
                }
            }
        }

        events
    }

    fn reset(&mut self) {
        self.pressed = false;
        self.last_pointer_pos = None;
    }
}
