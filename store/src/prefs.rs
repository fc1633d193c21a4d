//! Typed access to user preference keys.
//!
//! The core reads these values but does not own them; the UI writes them.

use pesaflow_common::CurrencyCode;

use crate::{keys, PersistentStore};

/// Read the user's selected display currency, if one has been persisted.
pub fn selected_currency(store: &dyn PersistentStore) -> Option<CurrencyCode> {
    store
        .get(keys::SELECTED_CURRENCY)
        .map(|code| CurrencyCode::new(code))
}

/// Persist the user's selected display currency.
pub fn set_selected_currency(store: &dyn PersistentStore, code: &CurrencyCode) {
    store.set(keys::SELECTED_CURRENCY, code.as_str());
}
