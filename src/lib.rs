#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod input;
pub mod panels;
pub mod preview;
pub mod renderer;
pub mod session;
pub mod state;
pub mod style;
pub mod surface;

pub use app::DoodleApp;
pub use config::{CanvasConfig, ShapeLeave};
pub use error::{CanvasError, CanvasResult, ConfigError};
pub use event::{EventBus, EventHandler, SessionEvent};
pub use history::{HistoryEntry, HistoryManager, MAX_HISTORY};
pub use input::{CanvasMetrics, InputHandler, PointerEvent};
pub use preview::PreviewCompositor;
pub use session::DrawingSession;
pub use state::SessionState;
pub use style::{PaintMode, PaintStyle, Tool};
pub use surface::RasterSurface;
