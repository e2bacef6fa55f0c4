//! Application: signs a user up using only abstractions.
//!
//! The logger, store and notifier are all bindings, so swapping a console
//! logger for a file logger or a database for the cloud is a wiring change.

use serde_json::{json, Value};

use super::data::DataService;
use super::notification::NotificationService;
use crate::capabilities::builtin::LOGGER;
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

#[derive(Debug, Clone)]
pub struct Application<'r> {
    registry: &'r CapabilityRegistry,
    logger: Binding,
    data: DataService<'r>,
    notifications: NotificationService<'r>,
}

impl<'r> Application<'r> {
    pub fn new(
        registry: &'r CapabilityRegistry,
        logger: Binding,
        data: DataService<'r>,
        notifications: NotificationService<'r>,
    ) -> Result<Self, DispatchError> {
        logger.expect_capability(LOGGER)?;
        Ok(Self {
            registry,
            logger,
            data,
            notifications,
        })
    }

    /// Save `user` and, when the save succeeded, welcome them by email.
    ///
    /// Returns whether the record was saved.
    pub fn run(&self, user: &Value) -> Result<bool, DispatchError> {
        self.log("INFO", "Application started")?;
        let saved = self.data.process_data(user)?.is_some();
        if saved {
            self.log("INFO", "Data processed successfully")?;
            let email = user.get("email").and_then(Value::as_str).unwrap_or_default();
            self.notifications
                .send_notification("Your account was created successfully", email)?;
        } else {
            self.log("ERROR", "Data could not be processed")?;
        }
        self.log("INFO", "Application finished")?;
        Ok(saved)
    }

    fn log(&self, level: &str, message: &str) -> Result<(), DispatchError> {
        self.registry
            .call(&self.logger, "log", &[json!(level), json!(message)])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::capabilities::builtin::{NOTIFY, STORE};
    use crate::events::{DispatchEventKind, EventLog};
    use crate::variants::builtin::{EchoNotifier, LogSink, LogWriter, MemoryStore, StoreBackend};

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::with_builtins().unwrap();
        let logger = registry.capability_handle(LOGGER).unwrap();
        let store = registry.capability_handle(STORE).unwrap();
        let notify = registry.capability_handle(NOTIFY).unwrap();
        registry
            .register_variant(
                LogWriter::new("log", LogSink::File("app.log".to_string())),
                &[logger],
            )
            .unwrap();
        registry
            .register_variant(
                MemoryStore::new("db", StoreBackend::database("sqlite://memory")),
                &[store],
            )
            .unwrap();
        registry
            .register_variant(EchoNotifier::new("echo"), &[notify])
            .unwrap();
        registry
    }

    fn application(registry: &CapabilityRegistry) -> Application<'_> {
        Application::new(
            registry,
            registry.bind_by_name("log", LOGGER).unwrap(),
            DataService::new(registry, registry.bind_by_name("db", STORE).unwrap()).unwrap(),
            NotificationService::new(registry, registry.bind_by_name("echo", NOTIFY).unwrap())
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_run_saves_logs_and_notifies() {
        let events = Arc::new(EventLog::new());
        let mut registry = registry();
        registry.add_listener(events.clone());
        let app = application(&registry);
        let user = json!({"id": "user_001", "name": "Ana Garcia", "email": "ana@example.com"});
        assert!(app.run(&user).unwrap());

        let mut logged = Vec::new();
        let mut notified = Vec::new();
        for event in events.events() {
            if let DispatchEventKind::InvocationCompleted {
                capability, result, ..
            } = event.kind
            {
                match capability.as_str() {
                    LOGGER => logged.push(result),
                    NOTIFY => notified.push(result),
                    _ => {}
                }
            }
        }
        assert_eq!(
            logged,
            vec![
                json!("[FILE INFO] Application started"),
                json!("[FILE INFO] Data processed successfully"),
                json!("[FILE INFO] Application finished"),
            ]
        );
        assert_eq!(notified, vec![json!(true)]);
    }

    #[test]
    fn test_user_without_email_fails_to_notify() {
        let registry = registry();
        let app = application(&registry);
        let err = app.run(&json!({"id": "user_002"})).unwrap_err();
        assert_eq!(err.code(), "variant_execution");
    }

    #[test]
    fn test_logger_binding_is_checked() {
        let registry = registry();
        let err = Application::new(
            &registry,
            registry.bind_by_name("echo", NOTIFY).unwrap(),
            DataService::new(&registry, registry.bind_by_name("db", STORE).unwrap()).unwrap(),
            NotificationService::new(&registry, registry.bind_by_name("echo", NOTIFY).unwrap())
                .unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.code(), "capability_mismatch");
    }
}
