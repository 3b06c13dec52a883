mod bus;
mod events;

pub use bus::EventBus;
pub use events::SessionEvent;

/// Receives every event emitted by a drawing session
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &SessionEvent);
}

/// Forward events into a channel the control panel can poll
impl EventHandler for futures::channel::mpsc::UnboundedSender<SessionEvent> {
    fn handle_event(&mut self, event: &SessionEvent) {
        if self.unbounded_send(event.clone()).is_err() {
            log::debug!("Event receiver dropped, discarding {:?}", event);
        }
    }
}
