mod canvas_panel;
mod control_panel;

pub use canvas_panel::canvas_panel;
pub use control_panel::control_panel;
