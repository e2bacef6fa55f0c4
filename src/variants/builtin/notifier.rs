//! Notifier variants for the `notify` capability.
//!
//! Sending is simulated: the message is logged and appended to the variant's
//! own outbox, so the effect is observable as soon as `send` returns.

use serde_json::{json, Value};

use crate::variants::factory::{config_str, VariantConfig};
use crate::variants::variant::{
    arg_str, unknown_method, MethodDescriptor, Variant, VariantError,
};

/// A message accepted by a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: String,
    pub message: String,
}

fn accept(
    outbox: &mut Vec<SentMessage>,
    args: &[Value],
) -> Result<SentMessage, VariantError> {
    let message = arg_str(args, 0, "message")?;
    let recipient = arg_str(args, 1, "recipient")?;
    if recipient.trim().is_empty() {
        return Err(VariantError::InvalidArgument("recipient is empty".to_string()));
    }
    let sent = SentMessage {
        recipient: recipient.to_string(),
        message: message.to_string(),
    };
    outbox.push(sent.clone());
    Ok(sent)
}

fn notify_methods() -> Vec<MethodDescriptor> {
    vec![
        MethodDescriptor::new("send", 2, "Deliver a message to a recipient"),
        MethodDescriptor::new("channel", 0, "Name of the delivery channel"),
        MethodDescriptor::new("outbox", 0, "Messages accepted so far"),
    ]
}

fn outbox_value(outbox: &[SentMessage]) -> Value {
    Value::Array(
        outbox
            .iter()
            .map(|m| json!({"recipient": m.recipient, "message": m.message}))
            .collect(),
    )
}

/// Accepts every message and keeps it.
#[derive(Debug, Clone)]
pub struct EchoNotifier {
    label: String,
    outbox: Vec<SentMessage>,
}

impl EchoNotifier {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            outbox: Vec::new(),
        }
    }

    pub fn sent(&self) -> &[SentMessage] {
        &self.outbox
    }
}

impl Variant for EchoNotifier {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        notify_methods()
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "send" => {
                let sent = accept(&mut self.outbox, args)?;
                log::info!("[Echo] {} <- {}", sent.recipient, sent.message);
                Ok(json!(true))
            }
            "channel" => Ok(json!("Echo")),
            "outbox" => Ok(outbox_value(&self.outbox)),
            _ => Err(unknown_method(&self.label, method)),
        }
    }
}

/// Delivery channel of a [`MessageNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Email { smtp_server: String },
    Sms { provider: String },
    WhatsApp,
    Push { platform: String },
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Email { .. } => "Email",
            Self::Sms { .. } => "SMS",
            Self::WhatsApp => "WhatsApp",
            Self::Push { .. } => "Push Notification",
        }
    }

    fn route(&self) -> String {
        match self {
            Self::Email { smtp_server } => format!("Email via {}", smtp_server),
            Self::Sms { provider } => format!("SMS via {}", provider),
            Self::WhatsApp => "WhatsApp".to_string(),
            Self::Push { platform } => format!("Push {}", platform),
        }
    }
}

/// A notifier bound to one delivery channel.
#[derive(Debug, Clone)]
pub struct MessageNotifier {
    label: String,
    channel: Channel,
    outbox: Vec<SentMessage>,
}

impl MessageNotifier {
    pub fn new(label: &str, channel: Channel) -> Self {
        Self {
            label: label.to_string(),
            channel,
            outbox: Vec::new(),
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn sent(&self) -> &[SentMessage] {
        &self.outbox
    }

    pub(super) fn email(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let smtp_server = config_str(config, "smtp_server")?;
        Ok(Box::new(Self::new(label, Channel::Email { smtp_server })))
    }

    pub(super) fn sms(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let provider = config_str(config, "provider")?;
        Ok(Box::new(Self::new(label, Channel::Sms { provider })))
    }

    pub(super) fn whatsapp(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, Channel::WhatsApp)))
    }

    pub(super) fn push(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let platform = config_str(config, "platform")?;
        Ok(Box::new(Self::new(label, Channel::Push { platform })))
    }
}

impl Variant for MessageNotifier {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        notify_methods()
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "send" => {
                let sent = accept(&mut self.outbox, args)?;
                log::info!("[{}] To: {} Message: {}", self.channel.route(), sent.recipient, sent.message);
                Ok(json!(true))
            }
            "channel" => Ok(json!(self.channel.name())),
            "outbox" => Ok(outbox_value(&self.outbox)),
            _ => Err(unknown_method(&self.label, method)),
        }
    }
}
