//! Currency registry and conversion.

use std::collections::HashMap;

use pesaflow_common::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::format::format_amount;

/// A supported currency and its rate against the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// Currency code (unique within a registry).
    pub code: CurrencyCode,
    /// Display symbol, e.g. `KSh`.
    pub symbol: String,
    /// Human-readable name.
    pub name: String,
    /// Units of this currency per 1 unit of the base currency.
    pub rate: Decimal,
}

impl Currency {
    /// Create a new currency entry.
    pub fn new(
        code: impl Into<CurrencyCode>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
            name: name.into(),
            rate,
        }
    }
}

/// Immutable table of supported currencies.
///
/// Conversion goes through the fixed base currency: an amount is divided by
/// the source rate and multiplied by the target rate. The registry holds no
/// mutable state after construction, so a shared reference may be used from
/// any number of callers without synchronization.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    base: CurrencyCode,
    currencies: HashMap<CurrencyCode, Currency>,
}

impl CurrencyRegistry {
    /// Build a registry from a base currency and a set of entries.
    ///
    /// Duplicate codes keep the first entry; later duplicates are dropped
    /// with a warning.
    pub fn new(base: impl Into<CurrencyCode>, entries: impl IntoIterator<Item = Currency>) -> Self {
        let base = base.into();
        let mut currencies = HashMap::new();
        for currency in entries {
            let code = currency.code.clone();
            if currencies.contains_key(&code) {
                warn!(code = %code, "Duplicate currency code ignored");
                continue;
            }
            currencies.insert(code, currency);
        }
        Self { base, currencies }
    }

    /// Production currency table. USD is the base; rates are units per USD.
    pub fn with_defaults() -> Self {
        Self::new(
            "USD",
            [
                Currency::new("USD", "$", "US Dollar", Decimal::ONE),
                Currency::new("KES", "KSh", "Kenyan Shilling", Decimal::from(130)),
                Currency::new("TZS", "TSh", "Tanzanian Shilling", Decimal::from(2600)),
                Currency::new("UGX", "USh", "Ugandan Shilling", Decimal::from(3800)),
                Currency::new("NGN", "₦", "Nigerian Naira", Decimal::from(1600)),
                Currency::new("GHS", "GH₵", "Ghanaian Cedi", Decimal::from(15)),
                Currency::new("ZAR", "R", "South African Rand", Decimal::from(18)),
                Currency::new("EUR", "€", "Euro", Decimal::new(92, 2)),
                Currency::new("GBP", "£", "British Pound", Decimal::new(79, 2)),
                Currency::new("INR", "₹", "Indian Rupee", Decimal::from(83)),
                Currency::new("PHP", "₱", "Philippine Peso", Decimal::from(56)),
            ],
        )
    }

    /// The base currency code.
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Look up a currency by code.
    pub fn get(&self, code: &CurrencyCode) -> Option<&Currency> {
        self.currencies.get(code)
    }

    /// Check whether a code is registered.
    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.currencies.contains_key(code)
    }

    /// All registered codes, in no particular order.
    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.currencies.keys()
    }

    /// Convert an amount between two registered currencies via the base.
    ///
    /// An unknown code does not fail the conversion: it is treated as 1:1
    /// with the base currency and a warning is recorded. Flagged for product
    /// confirmation; preserved here because display features rely on it.
    pub fn convert(&self, amount: Decimal, from: &CurrencyCode, to: &CurrencyCode) -> Decimal {
        amount / self.rate_or_base(from) * self.rate_or_base(to)
    }

    /// Render an amount with the currency's symbol and decimal convention.
    ///
    /// Non-base currencies are quoted in whole units (0 decimal places); the
    /// base currency uses 2. Unknown codes render with the bare code as the
    /// symbol.
    pub fn format(&self, amount: Decimal, code: &CurrencyCode) -> String {
        let decimals = if code == &self.base { 2 } else { 0 };
        match self.currencies.get(code) {
            Some(currency) => format_amount(amount, &currency.symbol, decimals),
            None => {
                warn!(code = %code, "Formatting amount for unknown currency");
                format_amount(amount, code.as_str(), decimals)
            }
        }
    }

    fn rate_or_base(&self, code: &CurrencyCode) -> Decimal {
        match self.currencies.get(code) {
            Some(currency) => currency.rate,
            None => {
                warn!(code = %code, "Unknown currency, falling back to base rate 1");
                Decimal::ONE
            }
        }
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn fixture_registry() -> CurrencyRegistry {
        CurrencyRegistry::new(
            "USD",
            [
                Currency::new("USD", "$", "US Dollar", Decimal::ONE),
                Currency::new("KES", "KSh", "Kenyan Shilling", dec!(130)),
                Currency::new("EUR", "€", "Euro", dec!(0.92)),
            ],
        )
    }

    #[test]
    fn test_convert_through_base() {
        let registry = fixture_registry();
        let kes = registry.convert(dec!(100), &CurrencyCode::usd(), &CurrencyCode::kes());
        assert_eq!(kes, dec!(13000));
    }

    #[test]
    fn test_identity_conversion() {
        let registry = fixture_registry();
        for code in ["USD", "KES", "EUR"] {
            let code = CurrencyCode::new(code);
            assert_eq!(registry.convert(dec!(42.5), &code, &code), dec!(42.5));
        }
    }

    #[test]
    fn test_unknown_currency_falls_back_to_base_rate() {
        let registry = fixture_registry();
        let unknown = CurrencyCode::new("XXX");

        // Unknown source behaves as if registered at rate 1.
        let converted = registry.convert(dec!(10), &unknown, &CurrencyCode::kes());
        let as_base = registry.convert(dec!(10), &CurrencyCode::usd(), &CurrencyCode::kes());
        assert_eq!(converted, as_base);

        // Unknown target too.
        let out = registry.convert(dec!(10), &CurrencyCode::usd(), &unknown);
        assert_eq!(out, dec!(10));
    }

    #[test]
    fn test_duplicate_codes_keep_first() {
        let registry = CurrencyRegistry::new(
            "USD",
            [
                Currency::new("KES", "KSh", "Kenyan Shilling", dec!(130)),
                Currency::new("KES", "KSh", "Duplicate", dec!(999)),
            ],
        );
        assert_eq!(registry.get(&CurrencyCode::kes()).unwrap().rate, dec!(130));
    }

    #[test]
    fn test_format_conventions() {
        let registry = fixture_registry();
        assert_eq!(
            registry.format(dec!(13000), &CurrencyCode::kes()),
            "KSh13,000"
        );
        assert_eq!(registry.format(dec!(100), &CurrencyCode::usd()), "$100.00");
    }

    #[test]
    fn test_format_unknown_code_uses_code_as_symbol() {
        let registry = fixture_registry();
        assert_eq!(
            registry.format(dec!(250), &CurrencyCode::new("XXX")),
            "XXX250"
        );
    }

    proptest! {
        #[test]
        fn prop_round_trip_conversion(
            cents in 0u64..1_000_000_000u64,
            from_idx in 0usize..3,
            to_idx in 0usize..3,
        ) {
            let registry = fixture_registry();
            let codes = [CurrencyCode::usd(), CurrencyCode::kes(), CurrencyCode::new("EUR")];
            let amount = Decimal::new(cents as i64, 2);

            let there = registry.convert(amount, &codes[from_idx], &codes[to_idx]);
            let back = registry.convert(there, &codes[to_idx], &codes[from_idx]);

            let tolerance = amount * dec!(0.000000001);
            prop_assert!((back - amount).abs() <= tolerance);
        }
    }
}
