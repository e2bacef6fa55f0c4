//! Built-in variants for the bundled capabilities.

pub mod bird;
pub mod commerce;
pub mod notifier;
pub mod office;
pub mod reporting;
pub mod shape;
pub mod store;

use serde_json::json;

pub use bird::{Bird, Movement, Species};
pub use commerce::{Discount, PaymentMethod, PaymentProcessor};
pub use notifier::{Channel, EchoNotifier, MessageNotifier, SentMessage};
pub use office::{DocumentScanner, LaserPrinter, MultiFunctionPrinter, SimplePrinter};
pub use reporting::{LogSink, LogWriter, ReportFormat, ReportFormatter};
pub use shape::{Circle, Rectangle, Triangle};
pub use store::{MemoryStore, StoreBackend};

use super::factory::{VariantConfig, VariantFactory};
use super::variant::{Variant, VariantError};

type BuildFn = fn(&str, &VariantConfig) -> Result<Box<dyn Variant>, VariantError>;

/// Factory backed by a plain constructor function.
struct FnFactory {
    kind: &'static str,
    defaults: &'static [(&'static str, &'static str)],
    build: BuildFn,
}

impl FnFactory {
    fn boxed(kind: &'static str, build: BuildFn) -> Box<dyn VariantFactory> {
        Self::with_defaults(kind, &[], build)
    }

    fn with_defaults(
        kind: &'static str,
        defaults: &'static [(&'static str, &'static str)],
        build: BuildFn,
    ) -> Box<dyn VariantFactory> {
        Box::new(Self {
            kind,
            defaults,
            build,
        })
    }
}

impl VariantFactory for FnFactory {
    fn kind(&self) -> &str {
        self.kind
    }

    fn defaults(&self) -> VariantConfig {
        self.defaults
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect()
    }

    fn create(&self, label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        (self.build)(label, config)
    }
}

fn build_echo(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
    Ok(Box::new(EchoNotifier::new(label)))
}

/// Factories for every built-in kind.
pub fn factories() -> Vec<Box<dyn VariantFactory>> {
    vec![
        FnFactory::boxed("echo_notifier", build_echo),
        FnFactory::with_defaults(
            "email_notifier",
            &[("smtp_server", "localhost")],
            MessageNotifier::email,
        ),
        FnFactory::with_defaults("sms_notifier", &[("provider", "Twilio")], MessageNotifier::sms),
        FnFactory::boxed("whatsapp_notifier", MessageNotifier::whatsapp),
        FnFactory::with_defaults("push_notifier", &[("platform", "iOS")], MessageNotifier::push),
        FnFactory::with_defaults(
            "database_store",
            &[("connection_string", "sqlite://memory")],
            MemoryStore::database,
        ),
        FnFactory::with_defaults("file_store", &[("base_path", "/data")], MemoryStore::file),
        FnFactory::with_defaults("cloud_store", &[("provider", "AWS S3")], MemoryStore::cloud),
        FnFactory::boxed("rectangle", Rectangle::build),
        FnFactory::boxed("circle", Circle::build),
        FnFactory::boxed("triangle", Triangle::build),
        FnFactory::with_defaults(
            "simple_printer",
            &[("model", "HP LaserJet Basic")],
            SimplePrinter::build,
        ),
        FnFactory::with_defaults(
            "laser_printer",
            &[("model", "Canon Color Laser")],
            LaserPrinter::build,
        ),
        FnFactory::with_defaults(
            "document_scanner",
            &[("model", "Epson Scanner Pro")],
            DocumentScanner::build,
        ),
        FnFactory::with_defaults(
            "multifunction_printer",
            &[("model", "Brother MFC-9000")],
            MultiFunctionPrinter::build,
        ),
        FnFactory::boxed("eagle", Bird::eagle),
        FnFactory::boxed("penguin", Bird::penguin),
        FnFactory::boxed("duck", Bird::duck),
        FnFactory::boxed("ostrich", Bird::ostrich),
        FnFactory::boxed("credit_card_processor", PaymentProcessor::credit_card),
        FnFactory::boxed("paypal_processor", PaymentProcessor::paypal),
        FnFactory::boxed("bitcoin_processor", PaymentProcessor::bitcoin),
        FnFactory::boxed("bank_transfer_processor", PaymentProcessor::bank_transfer),
        FnFactory::boxed("regular_discount", Discount::regular),
        FnFactory::boxed("vip_discount", Discount::vip),
        FnFactory::boxed("student_discount", Discount::student),
        FnFactory::boxed("senior_discount", Discount::senior),
        FnFactory::boxed("holiday_discount", Discount::holiday),
        FnFactory::boxed("html_formatter", ReportFormatter::html),
        FnFactory::boxed("pdf_formatter", ReportFormatter::pdf),
        FnFactory::boxed("json_formatter", ReportFormatter::json),
        FnFactory::boxed("console_logger", LogWriter::console),
        FnFactory::with_defaults("file_logger", &[("filename", "app.log")], LogWriter::file),
    ]
}
