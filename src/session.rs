//! The drawing session: one owner for tool, paint style, pointer state,
//! the visible surface, the preview scratch buffer and the undo history.
//!
//! Every public operation first drains deferred history work, the way an
//! event loop finishes queued microtasks before dispatching the next event.
//! Reads such as [`DrawingSession::can_undo`] do not, so right after a commit
//! or undo they may be stale until [`DrawingSession::settle`] runs and the
//! `UndoStateChanged` event fires.
use egui::{Color32, Pos2};
use futures::channel::mpsc::UnboundedReceiver;

use crate::config::{CanvasConfig, ShapeLeave};
use crate::error::CanvasResult;
use crate::event::{EventBus, EventHandler, SessionEvent};
use crate::history::HistoryManager;
use crate::input::PointerEvent;
use crate::preview::PreviewCompositor;
use crate::renderer;
use crate::state::SessionState;
use crate::style::{self, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, PaintStyle, Tool};
use crate::surface::RasterSurface;

pub struct DrawingSession {
    config: CanvasConfig,
    /// The visible canvas; `None` until the surface is sized
    surface: Option<RasterSurface>,
    preview: Option<PreviewCompositor>,
    history: HistoryManager,
    state: SessionState,
    tool: Tool,
    colour: Color32,
    brush_size: u32,
    is_erasing: bool,
    style: PaintStyle,
    event_bus: EventBus,
}

impl DrawingSession {
    pub fn new(config: CanvasConfig) -> Self {
        let colour = style::parse_hex_colour(&config.default_colour).unwrap_or_else(|err| {
            log::warn!("{}, falling back to black", err);
            Color32::BLACK
        });
        let brush_size = config.default_brush_size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);

        Self {
            history: HistoryManager::new(config.max_history),
            config,
            surface: None,
            preview: None,
            state: SessionState::Idle,
            tool: Tool::Brush,
            colour,
            brush_size,
            is_erasing: false,
            style: PaintStyle::derive(colour, brush_size, false),
            event_bus: EventBus::new(),
        }
    }

    /// Size the visible surface and its scratch buffer, then schedule the
    /// blank-canvas history entry.
    pub fn attach_surface(&mut self, width: u32, height: u32) -> CanvasResult<()> {
        let mut surface = RasterSurface::new(width, height)?;
        let preview = PreviewCompositor::new(width, height, self.config.preview_opacity)?;
        surface.apply_style(&self.style);

        self.history = HistoryManager::new(self.config.max_history);
        self.history.seed(&surface);
        self.surface = Some(surface);
        self.preview = Some(preview);
        self.state = SessionState::Idle;
        log::info!("Canvas surface ready at {}x{}", width, height);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    pub fn scratch(&self) -> Option<&RasterSurface> {
        self.preview.as_ref().map(|p| p.scratch())
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn colour(&self) -> Color32 {
        self.colour
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn is_erasing(&self) -> bool {
        self.is_erasing
    }

    pub fn paint_style(&self) -> PaintStyle {
        self.style
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.event_bus.subscribe(handler);
    }

    /// Receive session events over a channel
    pub fn events(&self) -> UnboundedReceiver<SessionEvent> {
        self.event_bus.channel()
    }

    // ---- Control panel ----

    pub fn select_colour(&mut self, hex: &str) -> CanvasResult<()> {
        self.settle();
        let colour = style::parse_hex_colour(hex)?;
        self.colour = colour;
        self.refresh_style();
        Ok(())
    }

    pub fn select_brush_size(&mut self, size: u32) {
        self.settle();
        let clamped = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
        if clamped != size {
            log::warn!("Brush size {} clamped to {}", size, clamped);
        }
        self.brush_size = clamped;
        self.refresh_style();
    }

    /// Erasing only applies to freehand strokes, so enabling it selects the brush
    pub fn toggle_eraser(&mut self, enabled: bool) {
        self.settle();
        if enabled && self.tool.is_shape() {
            self.set_tool(Tool::Brush);
        }
        self.is_erasing = enabled;
        self.refresh_style();
    }

    /// Selecting a shape tool turns the eraser off
    pub fn select_tool(&mut self, tool: Tool) {
        self.settle();
        self.set_tool(tool);
        if tool.is_shape() && self.is_erasing {
            log::debug!("{} selected, eraser disabled", tool.name());
            self.is_erasing = false;
        }
        self.refresh_style();
    }

    /// Erase every pixel and record the empty canvas so the clear can be undone
    pub fn clear_canvas(&mut self) {
        self.settle();
        if !self.state.is_idle() {
            log::debug!("Clear ignored while {}", self.state.name());
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            log::debug!("Clear ignored, surface not ready");
            return;
        };
        surface.clear();
        self.history.commit(surface);
    }

    pub fn undo(&mut self) {
        self.settle();
        if !self.state.is_idle() {
            log::debug!("Undo ignored while {}", self.state.name());
            return;
        }
        if self.surface.is_none() {
            return;
        }
        if !self.history.undo() {
            log::debug!("Nothing to undo");
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Run deferred history work and notify listeners after each step.
    ///
    /// Returns how many operations completed.
    pub fn settle(&mut self) -> usize {
        let Some(surface) = self.surface.as_mut() else {
            return 0;
        };
        let event_bus = &self.event_bus;
        self.history.settle(surface, |history| {
            event_bus.emit(SessionEvent::UndoStateChanged {
                can_undo: history.can_undo(),
            });
        })
    }

    // ---- Pointer input ----

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(pos),
            PointerEvent::Move(pos) => self.pointer_move(pos),
            PointerEvent::Up(pos) => self.pointer_up(pos),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2) {
        self.settle();
        if !self.state.is_idle() {
            return;
        }
        let (Some(surface), Some(preview)) = (self.surface.as_mut(), self.preview.as_mut()) else {
            return;
        };
        surface.apply_style(&self.style);

        let next = if self.tool.is_shape() {
            if let Err(err) = preview.begin(surface) {
                log::error!("Failed to capture preview base: {}", err);
                return;
            }
            SessionState::DraggingShape {
                tool: self.tool,
                start: pos,
                last: pos,
            }
        } else {
            SessionState::DrawingFreehand { last: pos }
        };
        self.transition(next);
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        self.settle();
        let (Some(surface), Some(preview)) = (self.surface.as_mut(), self.preview.as_ref()) else {
            return;
        };

        match self.state {
            SessionState::DrawingFreehand { last } => {
                renderer::paint_segment(surface, last, pos);
                self.state = SessionState::DrawingFreehand { last: pos };
            }
            SessionState::DraggingShape { tool, start, .. } => {
                if let Err(err) = preview.update(surface, tool, start, pos) {
                    log::error!("Failed to draw preview: {}", err);
                }
                self.state = SessionState::DraggingShape { tool, start, last: pos };
            }
            SessionState::Idle => {}
        }
    }

    pub fn pointer_up(&mut self, pos: Pos2) {
        self.settle();
        match self.state {
            SessionState::DrawingFreehand { .. } => self.finish_freehand(),
            SessionState::DraggingShape { tool, start, .. } => self.finish_shape(tool, start, pos),
            SessionState::Idle => {}
        }
    }

    pub fn pointer_leave(&mut self) {
        self.settle();
        match self.state {
            SessionState::DrawingFreehand { .. } => self.finish_freehand(),
            SessionState::DraggingShape { tool, start, last } => match self.config.shape_leave {
                ShapeLeave::Finalize => self.finish_shape(tool, start, last),
                ShapeLeave::Abandon => self.abandon_shape(),
            },
            SessionState::Idle => {}
        }
    }

    fn finish_freehand(&mut self) {
        // Any press counts as a stroke, moved or not
        if let Some(surface) = self.surface.as_ref() {
            self.history.commit(surface);
        }
        self.transition(SessionState::Idle);
        self.apply_pending_style();
    }

    fn finish_shape(&mut self, tool: Tool, start: Pos2, end: Pos2) {
        if let (Some(surface), Some(preview)) = (self.surface.as_mut(), self.preview.as_ref()) {
            match preview.commit(surface, tool, start, end) {
                Ok(()) => self.history.commit(surface),
                Err(err) => log::error!("Failed to commit {}: {}", tool.name(), err),
            }
        }
        self.transition(SessionState::Idle);
        self.apply_pending_style();
    }

    fn abandon_shape(&mut self) {
        if let (Some(surface), Some(preview)) = (self.surface.as_mut(), self.preview.as_ref()) {
            if let Err(err) = preview.abandon(surface) {
                log::error!("Failed to discard preview: {}", err);
            }
        }
        log::debug!("Shape abandoned, pointer left the canvas");
        self.transition(SessionState::Idle);
        self.apply_pending_style();
    }

    fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        let old = std::mem::replace(&mut self.tool, tool);
        log::info!("Tool changed: {} -> {}", old.name(), tool.name());
        self.event_bus.emit(SessionEvent::ToolChanged { old, new: tool });
    }

    fn transition(&mut self, new: SessionState) {
        if !self.state.can_transition_to(&new) {
            log::warn!("Invalid transition {} -> {}", self.state.name(), new.name());
            return;
        }
        let old = std::mem::replace(&mut self.state, new);
        self.event_bus.emit(SessionEvent::StateChanged { old, new });
    }

    /// Recompute the paint style; it reaches the surface now only when no
    /// stroke is in flight, otherwise at the next stroke.
    fn refresh_style(&mut self) {
        self.style = PaintStyle::derive(self.colour, self.brush_size, self.is_erasing);
        self.apply_pending_style();
    }

    fn apply_pending_style(&mut self) {
        if !self.state.is_idle() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.apply_style(&self.style);
        }
    }
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl std::fmt::Debug for DrawingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSession")
            .field("state", &self.state)
            .field("tool", &self.tool)
            .field("style", &self.style)
            .field("ready", &self.is_ready())
            .field("history_len", &self.history.len())
            .finish()
    }
}

