//! Office device variants for the `printer`, `color_printer`, `scanner` and
//! `copier` capabilities.
//!
//! Each device exposes only what it can actually do. A simple printer has no
//! scanning methods at all, so it cannot be registered as a scanner.

use serde_json::{json, Value};

use crate::variants::factory::{config_str, VariantConfig};
use crate::variants::variant::{arg_str, unknown_method, MethodDescriptor, Variant, VariantError};

/// Job counter and model name shared by every device.
#[derive(Debug, Clone)]
struct Device {
    label: String,
    model: String,
    jobs: u64,
}

impl Device {
    fn new(label: &str, model: &str) -> Self {
        Self {
            label: label.to_string(),
            model: model.to_string(),
            jobs: 0,
        }
    }

    fn next_job(&mut self) -> u64 {
        self.jobs += 1;
        self.jobs
    }

    fn print(&mut self, args: &[Value], color: bool) -> Result<Value, VariantError> {
        let document = arg_str(args, 0, "document")?;
        let job = self.next_job();
        log::info!(
            "[{}] printing{}: {}",
            self.model,
            if color { " in color" } else { "" },
            document
        );
        Ok(json!({
            "device": self.model,
            "job": job,
            "action": "print",
            "document": document,
            "color": color,
        }))
    }

    fn scan(&mut self) -> Value {
        let job = self.next_job();
        log::info!("[{}] scanning", self.model);
        json!({
            "device": self.model,
            "job": job,
            "action": "scan",
            "content": format!("Document scanned by {}", self.model),
        })
    }

    fn scan_to_email(&mut self, args: &[Value]) -> Result<Value, VariantError> {
        let email = arg_str(args, 0, "email")?;
        if !email.contains('@') {
            return Err(VariantError::InvalidArgument(format!(
                "'{}' is not an email address",
                email
            )));
        }
        let job = self.next_job();
        log::info!("[{}] sending scan to {}", self.model, email);
        Ok(json!({
            "device": self.model,
            "job": job,
            "action": "scan_to_email",
            "content": format!("Document scanned by {}", self.model),
            "email": email,
        }))
    }

    fn copy(&mut self, args: &[Value]) -> Result<Value, VariantError> {
        let document = arg_str(args, 0, "document")?;
        let job = self.next_job();
        log::info!("[{}] copying: {}", self.model, document);
        Ok(json!({
            "device": self.model,
            "job": job,
            "action": "copy",
            "document": document,
        }))
    }
}

fn print_method() -> MethodDescriptor {
    MethodDescriptor::new("print_document", 1, "Print in black and white")
}

fn print_color_method() -> MethodDescriptor {
    MethodDescriptor::new("print_color", 1, "Print in color")
}

fn scan_methods() -> Vec<MethodDescriptor> {
    vec![
        MethodDescriptor::new("scan_document", 0, "Scan the loaded document"),
        MethodDescriptor::new("scan_to_email", 1, "Scan and send to an address"),
    ]
}

fn copy_method() -> MethodDescriptor {
    MethodDescriptor::new("copy_document", 1, "Copy a document")
}

fn model_from(config: &VariantConfig) -> Result<String, VariantError> {
    config_str(config, "model")
}

/// Black and white printing only.
#[derive(Debug, Clone)]
pub struct SimplePrinter {
    device: Device,
}

impl SimplePrinter {
    pub fn new(label: &str, model: &str) -> Self {
        Self {
            device: Device::new(label, model),
        }
    }

    pub(super) fn build(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, &model_from(config)?)))
    }
}

impl Variant for SimplePrinter {
    fn label(&self) -> &str {
        &self.device.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![print_method()]
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "print_document" => self.device.print(args, false),
            _ => Err(unknown_method(&self.device.label, method)),
        }
    }
}

/// Black and white and color printing.
#[derive(Debug, Clone)]
pub struct LaserPrinter {
    device: Device,
}

impl LaserPrinter {
    pub fn new(label: &str, model: &str) -> Self {
        Self {
            device: Device::new(label, model),
        }
    }

    pub(super) fn build(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, &model_from(config)?)))
    }
}

impl Variant for LaserPrinter {
    fn label(&self) -> &str {
        &self.device.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![print_method(), print_color_method()]
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "print_document" => self.device.print(args, false),
            "print_color" => self.device.print(args, true),
            _ => Err(unknown_method(&self.device.label, method)),
        }
    }
}

/// Scanning only.
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    device: Device,
}

impl DocumentScanner {
    pub fn new(label: &str, model: &str) -> Self {
        Self {
            device: Device::new(label, model),
        }
    }

    pub(super) fn build(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, &model_from(config)?)))
    }
}

impl Variant for DocumentScanner {
    fn label(&self) -> &str {
        &self.device.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        scan_methods()
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "scan_document" => Ok(self.device.scan()),
            "scan_to_email" => self.device.scan_to_email(args),
            _ => Err(unknown_method(&self.device.label, method)),
        }
    }
}

/// Printing, color printing, scanning and copying in one device.
#[derive(Debug, Clone)]
pub struct MultiFunctionPrinter {
    device: Device,
}

impl MultiFunctionPrinter {
    pub fn new(label: &str, model: &str) -> Self {
        Self {
            device: Device::new(label, model),
        }
    }

    pub(super) fn build(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, &model_from(config)?)))
    }
}

impl Variant for MultiFunctionPrinter {
    fn label(&self) -> &str {
        &self.device.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        let mut methods = vec![print_method(), print_color_method(), copy_method()];
        methods.extend(scan_methods());
        methods
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "print_document" => self.device.print(args, false),
            "print_color" => self.device.print(args, true),
            "scan_document" => Ok(self.device.scan()),
            "scan_to_email" => self.device.scan_to_email(args),
            "copy_document" => self.device.copy(args),
            _ => Err(unknown_method(&self.device.label, method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_printer_exposes_only_printing() {
        let mut printer = SimplePrinter::new("basic", "HP LaserJet Basic");
        let names: Vec<String> = printer.methods().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["print_document"]);
        assert!(printer.call("scan_document", &[]).is_err());
    }

    #[test]
    fn test_job_counter_increments() {
        let mut mfp = MultiFunctionPrinter::new("mfp", "Brother MFC-9000");
        let first = mfp.call("print_document", &[json!("a")]).unwrap();
        let second = mfp.call("copy_document", &[json!("b")]).unwrap();
        assert_eq!(first["job"], json!(1));
        assert_eq!(second["job"], json!(2));
        assert_eq!(second["action"], json!("copy"));
    }

    #[test]
    fn test_scan_to_email_requires_address() {
        let mut scanner = DocumentScanner::new("scan", "Epson Scanner Pro");
        assert!(matches!(
            scanner.call("scan_to_email", &[json!("nobody")]),
            Err(VariantError::InvalidArgument(_))
        ));
        let sent = scanner
            .call("scan_to_email", &[json!("ana@example.com")])
            .unwrap();
        assert_eq!(sent["email"], json!("ana@example.com"));
        assert_eq!(sent["content"], json!("Document scanned by Epson Scanner Pro"));
    }

    #[test]
    fn test_laser_color_flag() {
        let mut laser = LaserPrinter::new("laser", "Canon Color Laser");
        let job = laser.call("print_color", &[json!("slides")]).unwrap();
        assert_eq!(job["color"], json!(true));
    }
}
