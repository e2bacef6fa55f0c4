//! Report formatters for the `report_format` capability and log writers for
//! the `logger` capability.

use serde_json::{json, Value};

use crate::variants::factory::{config_str, VariantConfig};
use crate::variants::variant::{arg_str, unknown_method, MethodDescriptor, Variant, VariantError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Pdf,
    Json,
}

impl ReportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Pdf => "PDF",
            Self::Json => "JSON",
        }
    }

    pub fn render(&self, content: &str) -> Result<String, VariantError> {
        match self {
            Self::Html => Ok(format!("<html><body>{}</body></html>", content)),
            Self::Pdf => Ok(format!("PDF: {}", content)),
            Self::Json => serde_json::to_string_pretty(&json!({ "report": content }))
                .map_err(|e| VariantError::ExecutionFailed(e.to_string())),
        }
    }
}

/// Renders report content in a single format.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    label: String,
    format: ReportFormat,
}

impl ReportFormatter {
    pub fn new(label: &str, format: ReportFormat) -> Self {
        Self {
            label: label.to_string(),
            format,
        }
    }

    pub(super) fn html(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, ReportFormat::Html)))
    }

    pub(super) fn pdf(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, ReportFormat::Pdf)))
    }

    pub(super) fn json(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, ReportFormat::Json)))
    }
}

impl Variant for ReportFormatter {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("format", 1, "Render report content"),
            MethodDescriptor::new("format_name", 0, "Output format"),
        ]
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "format" => Ok(json!(self.format.render(arg_str(args, 0, "content")?)?)),
            "format_name" => Ok(json!(self.format.name())),
            _ => Err(unknown_method(&self.label, method)),
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Console,
    /// Simulated file; lines are kept in memory.
    File(String),
}

impl LogSink {
    fn tag(&self) -> &'static str {
        match self {
            Self::Console => "CONSOLE",
            Self::File(_) => "FILE",
        }
    }
}

/// Writes leveled log lines to one sink and keeps every line written.
#[derive(Debug, Clone)]
pub struct LogWriter {
    label: String,
    sink: LogSink,
    lines: Vec<String>,
}

impl LogWriter {
    pub fn new(label: &str, sink: LogSink) -> Self {
        Self {
            label: label.to_string(),
            sink,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(super) fn console(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, LogSink::Console)))
    }

    pub(super) fn file(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let filename = config_str(config, "filename")?;
        Ok(Box::new(Self::new(label, LogSink::File(filename))))
    }

    fn write(&mut self, args: &[Value]) -> Result<Value, VariantError> {
        let level = arg_str(args, 0, "level")?.trim().to_uppercase();
        if level.is_empty() {
            return Err(VariantError::InvalidArgument("level is empty".to_string()));
        }
        let line = format!("[{} {}] {}", self.sink.tag(), level, arg_str(args, 1, "message")?);
        match &self.sink {
            LogSink::Console => log::info!("{}", line),
            LogSink::File(filename) => log::info!("writing to {}: {}", filename, line),
        }
        self.lines.push(line.clone());
        Ok(json!(line))
    }
}

impl Variant for LogWriter {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("log", 2, "Write a leveled line"),
            MethodDescriptor::new("lines", 0, "Lines written so far"),
        ]
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "log" => self.write(args),
            "lines" => Ok(json!(self.lines)),
            _ => Err(unknown_method(&self.label, method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        assert_eq!(
            ReportFormat::Html.render("sales").unwrap(),
            "<html><body>sales</body></html>"
        );
        assert_eq!(ReportFormat::Pdf.render("sales").unwrap(), "PDF: sales");
        let rendered = ReportFormat::Json.render("sales").unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, json!({"report": "sales"}));
    }

    #[test]
    fn test_formatter_through_call() {
        let mut pdf = ReportFormatter::new("pdf", ReportFormat::Pdf);
        assert_eq!(pdf.call("format_name", &[]).unwrap(), json!("PDF"));
        assert!(pdf.call("format", &[json!(3)]).is_err());
    }

    #[test]
    fn test_log_writer_keeps_lines() {
        let mut file = LogWriter::new("audit", LogSink::File("app.log".to_string()));
        let line = file
            .call("log", &[json!("info"), json!("started")])
            .unwrap();
        assert_eq!(line, json!("[FILE INFO] started"));
        assert_eq!(file.lines().to_vec(), vec!["[FILE INFO] started".to_string()]);
        assert!(matches!(
            file.call("log", &[json!("  "), json!("nothing")]),
            Err(VariantError::InvalidArgument(_))
        ));
    }
}
