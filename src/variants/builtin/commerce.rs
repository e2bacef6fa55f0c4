//! Payment processors for the `payment` capability and discount strategies
//! for the `discount` capability.
//!
//! New payment methods and discounts are new kinds in the catalog. The
//! services that charge and price orders never change.

use serde_json::{json, Value};

use crate::variants::factory::{config_positive, config_str, VariantConfig};
use crate::variants::variant::{arg_value, unknown_method, MethodDescriptor, Variant, VariantError};

fn amount_arg(args: &[Value]) -> Result<f64, VariantError> {
    match arg_value(args, 0, "amount")?.as_f64() {
        Some(amount) if amount >= 0.0 && amount.is_finite() => Ok(amount),
        _ => Err(VariantError::InvalidArgument(
            "'amount' must be a non-negative number".to_string(),
        )),
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    CreditCard,
    PayPal,
    Bitcoin,
    BankTransfer,
}

impl PaymentMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::PayPal => "PayPal",
            Self::Bitcoin => "Bitcoin",
            Self::BankTransfer => "Bank Transfer",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::CreditCard => "CC",
            Self::PayPal => "PP",
            Self::Bitcoin => "BTC",
            Self::BankTransfer => "BT",
        }
    }

    /// The payment detail this method charges against.
    pub fn detail_key(&self) -> &'static str {
        match self {
            Self::CreditCard => "card_number",
            Self::PayPal => "email",
            Self::Bitcoin => "wallet_address",
            Self::BankTransfer => "account_number",
        }
    }

    /// The part of the detail that is safe to show.
    fn mask(&self, detail: &str) -> String {
        match self {
            Self::CreditCard | Self::BankTransfer => {
                let skip = detail.chars().count().saturating_sub(4);
                format!("****{}", detail.chars().skip(skip).collect::<String>())
            }
            Self::Bitcoin => format!("{}...", detail.chars().take(6).collect::<String>()),
            Self::PayPal => detail.to_string(),
        }
    }
}

/// Charges payments through one payment method.
#[derive(Debug, Clone)]
pub struct PaymentProcessor {
    label: String,
    method: PaymentMethod,
    transactions: u32,
}

impl PaymentProcessor {
    pub fn new(label: &str, method: PaymentMethod) -> Self {
        Self {
            label: label.to_string(),
            method,
            transactions: 0,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub(super) fn credit_card(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, PaymentMethod::CreditCard)))
    }

    pub(super) fn paypal(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, PaymentMethod::PayPal)))
    }

    pub(super) fn bitcoin(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, PaymentMethod::Bitcoin)))
    }

    pub(super) fn bank_transfer(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, PaymentMethod::BankTransfer)))
    }

    fn process(&mut self, args: &[Value]) -> Result<Value, VariantError> {
        let amount = amount_arg(args)?;
        let key = self.method.detail_key();
        let detail = arg_value(args, 1, "details")?
            .get(key)
            .and_then(Value::as_str)
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| {
                VariantError::InvalidArgument(format!(
                    "'{}' is required for {}",
                    key,
                    self.method.name()
                ))
            })?;
        if self.method == PaymentMethod::PayPal && !detail.contains('@') {
            return Err(VariantError::InvalidArgument(format!(
                "'{}' is not an email address",
                detail
            )));
        }

        self.transactions += 1;
        let account = self.method.mask(detail);
        log::info!(
            "[{}] charging {:.2} to {}",
            self.method.name(),
            amount,
            account
        );
        Ok(json!({
            "status": "success",
            "transaction_id": format!("{}_{:04}", self.method.prefix(), self.transactions),
            "processor": self.method.name(),
            "amount": amount,
            "account": account,
        }))
    }
}

impl Variant for PaymentProcessor {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("process_payment", 2, "Charge an amount"),
            MethodDescriptor::new("processor_name", 0, "Name of the payment method"),
        ]
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "process_payment" => self.process(args),
            "processor_name" => Ok(json!(self.method.name())),
            _ => Err(unknown_method(&self.label, method)),
        }
    }
}

// ============================================================================
// Discounts
// ============================================================================

/// A percentage taken off the price.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount {
    label: String,
    title: String,
    percent: f64,
}

impl Discount {
    /// `percent` must lie in (0, 100].
    pub fn new(label: &str, title: &str, percent: f64) -> Result<Self, VariantError> {
        if !(percent > 0.0 && percent <= 100.0) {
            return Err(VariantError::InvalidConfig(format!(
                "discount must be between 0 and 100 percent, got {}",
                percent
            )));
        }
        Ok(Self {
            label: label.to_string(),
            title: title.to_string(),
            percent,
        })
    }

    pub fn apply(&self, amount: f64) -> f64 {
        amount * (100.0 - self.percent) / 100.0
    }

    pub fn describe(&self) -> String {
        format!("{} ({}%)", self.title, self.percent)
    }

    fn boxed(label: &str, title: &str, percent: f64) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, title, percent)?))
    }

    pub(super) fn regular(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Self::boxed(label, "Regular customer", 5.0)
    }

    pub(super) fn vip(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Self::boxed(label, "VIP customer", 15.0)
    }

    pub(super) fn student(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Self::boxed(label, "Student", 20.0)
    }

    pub(super) fn senior(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Self::boxed(label, "Senior", 25.0)
    }

    pub(super) fn holiday(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let holiday = config_str(config, "holiday")?;
        Self::boxed(label, &holiday, config_positive(config, "percentage")?)
    }
}

impl Variant for Discount {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("apply_discount", 1, "Price after the discount"),
            MethodDescriptor::new("discount_type", 0, "Describe the discount"),
        ]
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "apply_discount" => Ok(json!(self.apply(amount_arg(args)?))),
            "discount_type" => Ok(json!(self.describe())),
            _ => Err(unknown_method(&self.label, method)),
        }
    }
}
