//! OfficeManager: routes office work to devices by capability.
//!
//! Each operation asks for exactly the capability it needs, so a printer
//! that cannot scan is never handed a scanning job.

use serde_json::{json, Value};

use crate::capabilities::builtin::{COLOR_PRINTER, COPIER, PRINTER, SCANNER};
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

#[derive(Debug, Clone, Copy)]
pub struct OfficeManager<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> OfficeManager<'r> {
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn manage_printing(&self, printer: &Binding, document: &str) -> Result<Value, DispatchError> {
        printer.expect_capability(PRINTER)?;
        Ok(self
            .registry
            .call(printer, "print_document", &[json!(document)])?
            .value)
    }

    pub fn manage_color_printing(
        &self,
        printer: &Binding,
        document: &str,
    ) -> Result<Value, DispatchError> {
        printer.expect_capability(COLOR_PRINTER)?;
        Ok(self
            .registry
            .call(printer, "print_color", &[json!(document)])?
            .value)
    }

    pub fn manage_scanning(&self, scanner: &Binding) -> Result<Value, DispatchError> {
        scanner.expect_capability(SCANNER)?;
        Ok(self.registry.call(scanner, "scan_document", &[])?.value)
    }

    pub fn manage_scan_to_email(&self, scanner: &Binding, email: &str) -> Result<Value, DispatchError> {
        scanner.expect_capability(SCANNER)?;
        Ok(self
            .registry
            .call(scanner, "scan_to_email", &[json!(email)])?
            .value)
    }

    pub fn manage_copying(&self, copier: &Binding, document: &str) -> Result<Value, DispatchError> {
        copier.expect_capability(COPIER)?;
        Ok(self
            .registry
            .call(copier, "copy_document", &[json!(document)])?
            .value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::builtin::{DocumentScanner, MultiFunctionPrinter, SimplePrinter};

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::with_builtins().unwrap();
        let handles: Vec<_> = [PRINTER, COLOR_PRINTER, SCANNER, COPIER]
            .iter()
            .map(|name| registry.capability_handle(name).unwrap())
            .collect();
        registry
            .register_variant(SimplePrinter::new("basic", "HP LaserJet Basic"), &handles[..1])
            .unwrap();
        registry
            .register_variant(DocumentScanner::new("scanner", "Epson Scanner Pro"), &handles[2..3])
            .unwrap();
        registry
            .register_variant(MultiFunctionPrinter::new("mfp", "Brother MFC-9000"), &handles)
            .unwrap();
        registry
    }

    #[test]
    fn test_printing_on_any_printer() {
        let registry = registry();
        let office = OfficeManager::new(&registry);
        for label in ["basic", "mfp"] {
            let printer = registry.bind_by_name(label, PRINTER).unwrap();
            let job = office.manage_printing(&printer, "report.pdf").unwrap();
            assert_eq!(job["action"], json!("print"));
            assert_eq!(job["document"], json!("report.pdf"));
        }
    }

    #[test]
    fn test_simple_printer_cannot_be_bound_as_scanner() {
        let registry = registry();
        let err = registry.bind_by_name("basic", SCANNER).unwrap_err();
        assert_eq!(err.code(), "capability_not_claimed");
    }

    #[test]
    fn test_wrong_binding_rejected() {
        let registry = registry();
        let office = OfficeManager::new(&registry);
        let printer = registry.bind_by_name("mfp", PRINTER).unwrap();
        let err = office.manage_scanning(&printer).unwrap_err();
        assert_eq!(err.code(), "capability_mismatch");
    }

    #[test]
    fn test_scanning_and_copying() {
        let registry = registry();
        let office = OfficeManager::new(&registry);
        let scanner = registry.bind_by_name("scanner", SCANNER).unwrap();
        let scan = office.manage_scanning(&scanner).unwrap();
        assert_eq!(scan["content"], json!("Document scanned by Epson Scanner Pro"));

        let copier = registry.bind_by_name("mfp", COPIER).unwrap();
        let copy = office.manage_copying(&copier, "contract.pdf").unwrap();
        assert_eq!(copy["action"], json!("copy"));
    }
}
