use egui::Pos2;

use crate::style::Tool;

/// Pointer session state of the drawing surface.
///
/// ```text
///            pointer down (Brush)            pointer up / leave
///   ┌──────┐ ─────────────────► DrawingFreehand ─────────────────┐
///   │ Idle │                                                      │
///   └──────┘ ─────────────────► DraggingShape ───────────────────┤
///      ▲     pointer down (shape)             pointer up / leave  │
///      └──────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    /// Painting segment by segment straight onto the visible surface
    DrawingFreehand { last: Pos2 },
    /// Previewing a shape anchored at `start`
    DraggingShape { tool: Tool, start: Pos2, last: Pos2 },
}

impl SessionState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, new_state: &SessionState) -> bool {
        match (self, new_state) {
            (SessionState::Idle, SessionState::Idle) => false,
            (SessionState::Idle, _) => true,
            (_, SessionState::Idle) => true,
            (SessionState::DrawingFreehand { .. }, SessionState::DrawingFreehand { .. }) => true,
            (SessionState::DraggingShape { .. }, SessionState::DraggingShape { .. }) => true,
            _ => false,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, SessionState::DrawingFreehand { .. })
    }

    /// The shape anchor, present only while a shape drag is in progress
    pub fn start_point(&self) -> Option<Pos2> {
        match self {
            SessionState::DraggingShape { start, .. } => Some(*start),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::DrawingFreehand { .. } => "DrawingFreehand",
            SessionState::DraggingShape { .. } => "DraggingShape",
        }
    }
}
