//! Validation events raised while binding XML input.
//!
//! The unmarshaller reports structural findings as events instead of
//! failing outright. An installed [`ValidationEventHandler`] decides per
//! event whether unmarshalling continues; the fixed policy shipped here,
//! [`LenientHandler`], lets everything short of a fatal event pass.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// How bad a validation event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Something odd but harmless, e.g. an undeclared attribute.
    Warning,
    /// A structural problem the tree survives, e.g. a missing required
    /// attribute.
    Error,
    /// The input cannot be bound at all.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// One validation finding, with an approximate input location.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationEvent {
    /// Event severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Byte offset into the input where the finding was made, when known.
    pub offset: Option<u64>,
}

impl ValidationEvent {
    /// Creates an event without location information.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            offset: None,
        }
    }

    /// Attaches a byte offset.
    pub fn at_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for ValidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} at byte {}: {}", self.severity, offset, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Per-unmarshal policy deciding whether an event aborts the call.
pub trait ValidationEventHandler: Send {
    /// Handles one event. Returning `false` aborts the unmarshal.
    fn handle_event(&mut self, event: &ValidationEvent) -> bool;
}

/// Shared buffer of events recorded during one unmarshal call.
///
/// Cloning is cheap; the handler installed on the unmarshaller and the
/// caller that wants the record afterwards hold the same buffer.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<ValidationEvent>>>,
}

impl EventRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&self, event: ValidationEvent) {
        self.events.lock().push(event);
    }

    /// Drains and returns everything recorded so far.
    pub fn take(&self) -> Vec<ValidationEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

/// The fixed unmarshal policy: warnings and recoverable errors are logged
/// and recorded, only fatal events abort.
pub struct LenientHandler {
    label: String,
    recorder: EventRecorder,
}

impl LenientHandler {
    /// Creates a handler. `label` identifies the part in log records.
    pub fn new(label: impl Into<String>, recorder: EventRecorder) -> Self {
        Self {
            label: label.into(),
            recorder,
        }
    }
}

impl ValidationEventHandler for LenientHandler {
    fn handle_event(&mut self, event: &ValidationEvent) -> bool {
        self.recorder.record(event.clone());
        match event.severity {
            Severity::Warning => {
                tracing::debug!(part = %self.label, "{event}");
                true
            }
            Severity::Error => {
                tracing::warn!(part = %self.label, "{event}");
                true
            }
            Severity::Fatal => {
                tracing::warn!(part = %self.label, "unmarshalling aborted: {event}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_handler_continues_below_fatal() {
        let recorder = EventRecorder::new();
        let mut handler = LenientHandler::new("/test/part.xml", recorder.clone());
        assert!(handler.handle_event(&ValidationEvent::new(Severity::Warning, "odd")));
        assert!(handler.handle_event(&ValidationEvent::new(Severity::Error, "bad")));
        assert!(!handler.handle_event(&ValidationEvent::new(Severity::Fatal, "broken")));
        assert_eq!(recorder.take().len(), 3);
    }

    #[test]
    fn test_event_display_includes_offset() {
        let event = ValidationEvent::new(Severity::Warning, "odd").at_offset(42);
        assert_eq!(event.to_string(), "warning at byte 42: odd");
    }
}
