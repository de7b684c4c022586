//! Shared test helper functions for unit tests.
//!
//! This module provides reusable test utilities to avoid duplication
//! across test modules in the codebase.

use crate::account::{Account, Utxo};
use crate::crypto::{Address, PrivateKey};
use crate::token_id::TokenId;

/// Builds a funded account with one native-token utxo of `amount`.
pub fn funded_account(amount: u64) -> Account {
    let mut account = Account::new(PrivateKey::new_key());
    account.insert_utxo(Utxo::new("seed".to_string(), 0, amount, TokenId::native()));
    account
}

/// A fresh random address, useful anywhere a destination is needed but
/// its specific value doesn't matter to the test.
pub fn random_address() -> Address {
    PrivateKey::new_key().public_key().address()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funded_account_has_the_requested_balance() {
        let account = funded_account(500);
        assert_eq!(account.balance(&TokenId::native()), 500);
    }

    #[test]
    fn random_addresses_are_distinct() {
        assert_ne!(random_address(), random_address());
    }
}
