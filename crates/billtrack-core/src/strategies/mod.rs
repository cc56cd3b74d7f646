//! Supplier-specific extraction strategies.
//!
//! Each supplier module declares its anchors and row patterns and hands them
//! to the shared engines in [`layout`]. Adding a supplier layout means adding
//! a module here and listing it in [`builtin`]; nothing else changes.

pub mod evergreen;
pub mod fu_luxe;
pub mod harbour_dairy;
pub mod layout;
pub mod sourdough;

pub use evergreen::EvergreenInvoice;
pub use fu_luxe::{FuLuxeInvoice, FuLuxeStatement};
pub use harbour_dairy::HarbourDairyStatement;
pub use layout::{AmountRule, DateRule, InvoiceLayout, StatementLayout};
pub use sourdough::{SourdoughInvoice, SourdoughStatement};

use crate::registry::ExtractionStrategy;

/// Every shipped strategy, in classifier candidate order.
pub fn builtin() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(SourdoughInvoice::new()),
        Box::new(FuLuxeInvoice::new()),
        Box::new(EvergreenInvoice::new()),
        Box::new(SourdoughStatement::new()),
        Box::new(FuLuxeStatement::new()),
        Box::new(HarbourDairyStatement::new()),
    ]
}
