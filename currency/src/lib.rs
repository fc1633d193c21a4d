//! Pesaflow Currency Engine
//!
//! Currency registry with pure conversion and display formatting.
//!
//! # Features
//!
//! - Injectable registry instance (no global mutable table)
//! - Conversion through a fixed base currency
//! - Soft fallback for unknown codes (treated as 1:1 with base)
//! - Locale-style formatting with per-currency decimal conventions
//!
//! # Example
//!
//! ```rust,ignore
//! use pesaflow_currency::CurrencyRegistry;
//! use pesaflow_common::CurrencyCode;
//! use rust_decimal_macros::dec;
//!
//! let registry = CurrencyRegistry::with_defaults();
//!
//! let kes = registry.convert(dec!(100), &CurrencyCode::usd(), &CurrencyCode::kes());
//! let display = registry.format(kes, &CurrencyCode::kes()); // "KSh13,000"
//! ```

pub mod format;
pub mod registry;

pub use format::format_amount;
pub use registry::{Currency, CurrencyRegistry};
