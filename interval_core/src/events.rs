//! Delivery of engine signals to audio/haptic collaborators.

use crate::EngineEvent;

/// Receiver for engine signals
pub trait EventSink {
    fn emit(&mut self, event: &EngineEvent);
}

/// Recording sink, mostly useful in tests
impl EventSink for Vec<EngineEvent> {
    fn emit(&mut self, event: &EngineEvent) {
        self.push(*event);
    }
}

/// Sink that writes every signal to the tracing log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::PhaseTransition(phase) => {
                tracing::info!("Phase transition: {:?}", phase)
            }
            EngineEvent::CountdownWarning(seconds) => {
                tracing::debug!("Countdown: {}s left", seconds)
            }
            EngineEvent::WorkoutComplete => tracing::info!("Workout complete"),
        }
    }
}

/// Forward `events` to `sink` in order
pub fn dispatch<S: EventSink + ?Sized>(events: &[EngineEvent], sink: &mut S) {
    for event in events {
        sink.emit(event);
    }
}
