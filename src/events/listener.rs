//! Dispatch listeners: recording and console narration.

use parking_lot::Mutex;

use super::dispatch_event::{DispatchEvent, DispatchEventKind};
use crate::utilities::printer::{Printer, PrinterColor};

/// Receives every event emitted by a registry it is attached to.
pub trait DispatchListener: Send + Sync {
    fn on_event(&self, event: &DispatchEvent);
}

/// Keeps every received event in memory, in emission order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<DispatchEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<DispatchEvent> {
        self.events.lock().clone()
    }

    /// Event type strings in emission order.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.event_type()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DispatchListener for EventLog {
    fn on_event(&self, event: &DispatchEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Prints a human-readable line for each event.
#[derive(Debug, Clone, Default)]
pub struct NarrationListener {
    printer: Printer,
}

impl NarrationListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the narration line and its color for an event.
    pub fn narrate(event: &DispatchEvent) -> (String, PrinterColor) {
        match &event.kind {
            DispatchEventKind::CapabilityDeclared {
                capability,
                methods,
            } => (
                format!("declared capability '{}' [{}]", capability, methods.join(", ")),
                PrinterColor::Blue,
            ),
            DispatchEventKind::VariantRegistered {
                variant,
                capabilities,
            } => (
                format!("registered '{}' as {}", variant, capabilities.join(" + ")),
                PrinterColor::Cyan,
            ),
            DispatchEventKind::RegistrationRejected {
                variant, message, ..
            } => (
                format!("rejected '{}': {}", variant, message),
                PrinterColor::BoldYellow,
            ),
            DispatchEventKind::InvocationCompleted {
                variant,
                capability,
                method,
                result,
            } => (
                format!("{}.{} via '{}' -> {}", capability, method, variant, result),
                PrinterColor::Green,
            ),
            DispatchEventKind::InvocationFailed {
                variant,
                capability,
                method,
                message,
                ..
            } => (
                format!("{}.{} via '{}' failed: {}", capability, method, variant, message),
                PrinterColor::Red,
            ),
        }
    }
}

impl DispatchListener for NarrationListener {
    fn on_event(&self, event: &DispatchEvent) {
        let (line, color) = Self::narrate(event);
        self.printer
            .print(&format!("  [{:>3}] {}", event.sequence, line), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completed() -> DispatchEvent {
        DispatchEvent::new(
            1,
            DispatchEventKind::InvocationCompleted {
                variant: "circle".to_string(),
                capability: "shape".to_string(),
                method: "kind".to_string(),
                result: json!("Circle"),
            },
        )
    }

    #[test]
    fn test_event_log_records_in_order() {
        let log = EventLog::new();
        assert!(log.is_empty());
        log.on_event(&completed());
        log.on_event(&DispatchEvent::new(
            2,
            DispatchEventKind::RegistrationRejected {
                variant: "simple".to_string(),
                code: "incomplete_implementation".to_string(),
                message: "missing scan_document/0".to_string(),
            },
        ));
        assert_eq!(
            log.event_types(),
            vec!["invocation_completed", "registration_rejected"]
        );
        log.clear();
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn test_narrate_completed() {
        let (line, color) = NarrationListener::narrate(&completed());
        assert_eq!(line, "shape.kind via 'circle' -> \"Circle\"");
        assert_eq!(color, PrinterColor::Green);
    }
}
