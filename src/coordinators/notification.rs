//! NotificationService: sends messages through any `notify` variant.

use serde_json::json;

use crate::capabilities::builtin::NOTIFY;
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

/// Sends notifications without knowing the delivery channel.
#[derive(Debug, Clone)]
pub struct NotificationService<'r> {
    registry: &'r CapabilityRegistry,
    notifier: Binding,
}

impl<'r> NotificationService<'r> {
    /// Fails with `CapabilityMismatch` unless `notifier` is bound to `notify`.
    pub fn new(registry: &'r CapabilityRegistry, notifier: Binding) -> Result<Self, DispatchError> {
        notifier.expect_capability(NOTIFY)?;
        Ok(Self { registry, notifier })
    }

    /// Send `message` to `recipient`; returns the variant's acknowledgement.
    pub fn send_notification(&self, message: &str, recipient: &str) -> Result<bool, DispatchError> {
        log::debug!(
            "Notifying {} through '{}'",
            recipient,
            self.notifier.variant_label()
        );
        let invocation = self
            .registry
            .call(&self.notifier, "send", &[json!(message), json!(recipient)])?;
        Ok(invocation.value.as_bool().unwrap_or(false))
    }

    /// Name of the channel behind the binding.
    pub fn channel(&self) -> Result<String, DispatchError> {
        let invocation = self.registry.call(&self.notifier, "channel", &[])?;
        Ok(invocation.value.as_str().unwrap_or_default().to_string())
    }

    pub fn binding(&self) -> &Binding {
        &self.notifier
    }
}
