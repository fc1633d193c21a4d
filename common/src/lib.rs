//! Pesaflow Common Types
//!
//! This crate contains shared types used across the Pesaflow pipeline,
//! including identifiers, currency codes, and the transaction model with
//! its status state machine.

pub mod currency_code;
pub mod identifiers;
pub mod transaction;

pub use currency_code::*;
pub use identifiers::*;
pub use transaction::*;
