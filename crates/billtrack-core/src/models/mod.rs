//! Data models for extraction output and configuration.

pub mod config;
pub mod record;

pub use config::BilltrackConfig;
pub use record::{
    CanonicalRecord, DuplicateKey, Parties, Payment, PaymentStatus, RawAmount, RawFieldSet,
};
