use eframe::egui;
use futures::channel::mpsc::UnboundedReceiver;

use crate::config::CanvasConfig;
use crate::event::SessionEvent;
use crate::input::{CanvasMetrics, InputHandler};
use crate::panels;
use crate::session::DrawingSession;

pub struct DoodleApp {
    session: DrawingSession,
    events: UnboundedReceiver<SessionEvent>,
    input: InputHandler,
    texture: Option<egui::TextureHandle>,
    uploaded_generation: Option<u64>,
    /// Last undo state reported by the session; drives the Undo button
    can_undo: bool,
}

impl DoodleApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: CanvasConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self::with_config(config)
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        let session = DrawingSession::new(config);
        let events = session.events();
        Self {
            session,
            events,
            input: InputHandler::new(),
            texture: None,
            uploaded_generation: None,
            can_undo: false,
        }
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DrawingSession {
        &mut self.session
    }

    pub fn can_undo(&self) -> bool {
        self.can_undo
    }

    /// Attach the raster surface the first time the canvas is laid out
    pub fn ensure_surface(&mut self) {
        if self.session.is_ready() {
            return;
        }
        let (width, height) = (self.session.config().width, self.session.config().height);
        if let Err(err) = self.session.attach_surface(width, height) {
            log::error!("Failed to create canvas surface: {}", err);
        }
    }

    pub fn handle_canvas_input(&mut self, pointer_pos: Option<egui::Pos2>, button_down: bool, metrics: &CanvasMetrics) {
        for event in self.input.process(pointer_pos, button_down, metrics) {
            self.session.handle_pointer(event);
        }
    }

    /// Finish deferred history work and refresh the cached undo state
    pub fn sync(&mut self) {
        self.session.settle();
        while let Ok(Some(event)) = self.events.try_next() {
            match event {
                SessionEvent::UndoStateChanged { can_undo } => self.can_undo = can_undo,
                SessionEvent::StateChanged { old, new } => {
                    log::debug!("Session state: {} -> {}", old.name(), new.name());
                }
                SessionEvent::ToolChanged { .. } => {}
            }
        }
    }

    /// Upload the surface to the GPU when its pixels changed since the last frame
    pub fn upload_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        let surface = self.session.surface()?;
        let generation = surface.generation();

        if let Some(texture) = self.texture.as_mut() {
            if self.uploaded_generation != Some(generation) {
                texture.set(surface.to_color_image(), egui::TextureOptions::LINEAR);
            }
        } else {
            self.texture = Some(ctx.load_texture(
                "doodle_canvas",
                surface.to_color_image(),
                egui::TextureOptions::LINEAR,
            ));
        }
        self.uploaded_generation = Some(generation);
        self.texture.as_ref().map(|t| t.id())
    }
}

impl eframe::App for DoodleApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z)) {
            self.session.undo();
        }

        self.sync();
        panels::control_panel(self, ctx);
        panels::canvas_panel(self, ctx);

        // Strokes and restores from this frame settle before the next one
        if self.session.history().has_pending() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn app() -> DoodleApp {
        let mut config = CanvasConfig::default();
        config.width = 200;
        config.height = 100;
        let mut app = DoodleApp::with_config(config);
        app.ensure_surface();
        app.sync();
        app
    }

    #[test]
    fn test_undo_flag_follows_session_events() {
        let mut app = app();
        assert!(!app.can_undo());

        let metrics = CanvasMetrics::new(egui::Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 50.0)), [200, 100]);
        app.handle_canvas_input(Some(pos2(10.0, 10.0)), true, &metrics);
        app.handle_canvas_input(Some(pos2(40.0, 20.0)), true, &metrics);
        app.handle_canvas_input(Some(pos2(40.0, 20.0)), false, &metrics);
        // Still stale until the deferred commit settles
        assert!(!app.can_undo());

        app.sync();
        assert!(app.can_undo());

        app.session_mut().undo();
        app.sync();
        assert!(!app.can_undo());
    }

    #[test]
    fn test_texture_uploads_only_on_change() {
        let ctx = egui::Context::default();
        let mut app = app();
        let first = app.upload_texture(&ctx);
        assert!(first.is_some());
        let generation = app.uploaded_generation;
        assert_eq!(app.upload_texture(&ctx), first);
        assert_eq!(app.uploaded_generation, generation);
    }
}
