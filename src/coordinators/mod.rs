//! Coordinators: high-level services that depend on capabilities only.
//!
//! Each coordinator borrows the registry and holds `Binding`s for the
//! capabilities it needs. None of them names a concrete variant type, so a
//! new variant never requires a change here.

pub mod application;
pub mod area;
pub mod bird_care;
pub mod commerce;
pub mod data;
pub mod notification;
pub mod office;
pub mod report;

pub use application::Application;
pub use area::AreaCalculator;
pub use bird_care::{BirdCare, Exercise};
pub use commerce::{PaymentService, PriceBreakdown, PriceCalculator};
pub use data::DataService;
pub use notification::NotificationService;
pub use office::OfficeManager;
pub use report::ReportService;
