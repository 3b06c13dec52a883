use crate::state::SessionState;
use crate::style::Tool;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A deferred history operation completed; `can_undo` is now current
    UndoStateChanged { can_undo: bool },
    StateChanged {
        old: SessionState,
        new: SessionState,
    },
    ToolChanged {
        old: Tool,
        new: Tool,
    },
}
