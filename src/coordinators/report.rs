//! ReportService: generates report content, renders it through any
//! `report_format` variant and saves it.

use std::path::Path;

use serde_json::{json, Value};

use crate::capabilities::builtin::REPORT_FORMAT;
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

#[derive(Debug, Clone, Copy)]
pub struct ReportService<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> ReportService<'r> {
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn generate_content(&self, data: &Value) -> String {
        format!("Report generated with data: {}", data)
    }

    /// Generate and render without saving.
    pub fn render(&self, data: &Value, formatter: &Binding) -> Result<String, DispatchError> {
        formatter.expect_capability(REPORT_FORMAT)?;
        let content = self.generate_content(data);
        let rendered = self.registry.call(formatter, "format", &[json!(content)])?;
        Ok(rendered.value.as_str().unwrap_or_default().to_string())
    }

    /// Generate, render and write the report to `destination`.
    pub fn process_report(
        &self,
        data: &Value,
        formatter: &Binding,
        destination: &Path,
    ) -> Result<String, DispatchError> {
        let rendered = self.render(data, formatter)?;
        std::fs::write(destination, &rendered)?;
        log::info!(
            "Saved report rendered by '{}' to {}",
            formatter.variant_label(),
            destination.display()
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::builtin::{ReportFormat, ReportFormatter};

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::with_builtins().unwrap();
        let format = registry.capability_handle(REPORT_FORMAT).unwrap();
        for (label, kind) in [
            ("html", ReportFormat::Html),
            ("pdf", ReportFormat::Pdf),
            ("json", ReportFormat::Json),
        ] {
            registry
                .register_variant(ReportFormatter::new(label, kind), &[format])
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_render_in_every_format() {
        let registry = registry();
        let service = ReportService::new(&registry);
        let data = json!("monthly sales");

        let html = service
            .render(&data, &registry.bind_by_name("html", REPORT_FORMAT).unwrap())
            .unwrap();
        assert_eq!(
            html,
            "<html><body>Report generated with data: \"monthly sales\"</body></html>"
        );
        let pdf = service
            .render(&data, &registry.bind_by_name("pdf", REPORT_FORMAT).unwrap())
            .unwrap();
        assert!(pdf.starts_with("PDF: Report generated"));
        let rendered = service
            .render(&data, &registry.bind_by_name("json", REPORT_FORMAT).unwrap())
            .unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert!(parsed["report"].is_string());
    }

    #[test]
    fn test_process_report_writes_file() {
        let registry = registry();
        let service = ReportService::new(&registry);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        let rendered = service
            .process_report(
                &json!({"total": 3}),
                &registry.bind_by_name("html", REPORT_FORMAT).unwrap(),
                &path,
            )
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), rendered);
    }

    #[test]
    fn test_unwritable_destination_is_io_error() {
        let registry = registry();
        let service = ReportService::new(&registry);
        let dir = tempfile::tempdir().unwrap();
        let err = service
            .process_report(
                &json!(1),
                &registry.bind_by_name("pdf", REPORT_FORMAT).unwrap(),
                &dir.path().join("missing").join("report.pdf"),
            )
            .unwrap_err();
        assert_eq!(err.code(), "io");
    }
}
