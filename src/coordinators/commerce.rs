//! PaymentService and PriceCalculator: charge and price orders through any
//! `payment` or `discount` variant.

use serde_json::{json, Value};

use crate::capabilities::builtin::{DISCOUNT, PAYMENT};
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

#[derive(Debug, Clone, Copy)]
pub struct PaymentService<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> PaymentService<'r> {
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// Charge `amount` and return the processor's receipt.
    pub fn process_order_payment(
        &self,
        processor: &Binding,
        amount: f64,
        details: &Value,
    ) -> Result<Value, DispatchError> {
        processor.expect_capability(PAYMENT)?;
        let name = self.registry.call(processor, "processor_name", &[])?;
        log::info!("Processing {:.2} with {}", amount, name.value);

        let receipt = self
            .registry
            .call(processor, "process_payment", &[json!(amount), details.clone()])?
            .value;
        if receipt.get("status") == Some(&json!("success")) {
            log::info!(
                "Payment succeeded, transaction {}",
                receipt.get("transaction_id").unwrap_or(&Value::Null)
            );
        } else {
            log::warn!("Payment through '{}' was not successful", processor.variant_label());
        }
        Ok(receipt)
    }
}

/// How a discount changed a price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub original: f64,
    pub discount_type: String,
    pub discount_amount: f64,
    pub final_price: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PriceCalculator<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> PriceCalculator<'r> {
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn final_price(&self, discount: &Binding, original: f64) -> Result<f64, DispatchError> {
        discount.expect_capability(DISCOUNT)?;
        let price = self
            .registry
            .call(discount, "apply_discount", &[json!(original)])?;
        Ok(price.value.as_f64().unwrap_or(original))
    }

    pub fn price_breakdown(
        &self,
        discount: &Binding,
        original: f64,
    ) -> Result<PriceBreakdown, DispatchError> {
        let final_price = self.final_price(discount, original)?;
        let discount_type = self.registry.call(discount, "discount_type", &[])?;
        Ok(PriceBreakdown {
            original,
            discount_type: discount_type.value.as_str().unwrap_or_default().to_string(),
            discount_amount: original - final_price,
            final_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::builtin::{Discount, PaymentMethod, PaymentProcessor};

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::with_builtins().unwrap();
        let payment = registry.capability_handle(PAYMENT).unwrap();
        let discount = registry.capability_handle(DISCOUNT).unwrap();
        for (label, method) in [
            ("card", PaymentMethod::CreditCard),
            ("paypal", PaymentMethod::PayPal),
            ("btc", PaymentMethod::Bitcoin),
        ] {
            registry
                .register_variant(PaymentProcessor::new(label, method), &[payment])
                .unwrap();
        }
        registry
            .register_variant(Discount::new("student", "Student", 20.0).unwrap(), &[discount])
            .unwrap();
        registry
    }

    #[test]
    fn test_payment_service_works_with_any_processor() {
        let registry = registry();
        let service = PaymentService::new(&registry);
        let details = json!({
            "card_number": "1234567890123456",
            "email": "ana@example.com",
            "wallet_address": "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
        });
        for (label, prefix) in [("card", "CC_"), ("paypal", "PP_"), ("btc", "BTC_")] {
            let binding = registry.bind_by_name(label, PAYMENT).unwrap();
            let receipt = service.process_order_payment(&binding, 150.0, &details).unwrap();
            assert_eq!(receipt["status"], json!("success"));
            let id = receipt["transaction_id"].as_str().unwrap();
            assert!(id.starts_with(prefix), "{}", id);
        }
    }

    #[test]
    fn test_payment_without_details_fails() {
        let registry = registry();
        let service = PaymentService::new(&registry);
        let binding = registry.bind_by_name("card", PAYMENT).unwrap();
        let err = service
            .process_order_payment(&binding, 10.0, &json!({}))
            .unwrap_err();
        assert_eq!(err.code(), "variant_execution");
    }

    #[test]
    fn test_price_breakdown() {
        let registry = registry();
        let calculator = PriceCalculator::new(&registry);
        let student = registry.bind_by_name("student", DISCOUNT).unwrap();
        let breakdown = calculator.price_breakdown(&student, 100.0).unwrap();
        assert_eq!(breakdown.final_price, 80.0);
        assert_eq!(breakdown.discount_amount, 20.0);
        assert_eq!(breakdown.discount_type, "Student (20%)");

        let card = registry.bind_by_name("card", PAYMENT).unwrap();
        assert_eq!(
            calculator.final_price(&card, 100.0).unwrap_err().code(),
            "capability_mismatch"
        );
    }
}
