//! Account-state table shared by every frame of a call tree

use std::collections::HashMap;

use bytes::Bytes;
use sevm_crypto::keccak256;
use sevm_primitives::Address;

use crate::word::{self, Word};

/// Account entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Account balance
    pub balance: Word,
    /// Contract code
    pub code: Bytes,
    /// Disassembly of `code`, kept for diagnostics only
    pub asm: Option<String>,
}

impl Account {
    /// Plain account holding only a balance
    pub fn with_balance(balance: Word) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Contract account
    pub fn with_code(balance: Word, code: impl Into<Bytes>) -> Self {
        Self {
            balance,
            code: code.into(),
            asm: None,
        }
    }
}

/// Address-keyed account table.
///
/// Owned by the top-level caller and lent as `&mut` to each nested frame.
/// Cloning is cheap for code because [`Bytes`] is reference counted, which is
/// what frame snapshots rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldState {
    accounts: HashMap<Address, Account>,
}

impl WorldState {
    /// Creates a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets an account
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Gets an account for modification
    pub fn get_mut(&mut self, address: &Address) -> Option<&mut Account> {
        self.accounts.get_mut(address)
    }

    /// Inserts or replaces an account
    pub fn insert(&mut self, address: Address, account: Account) {
        self.accounts.insert(address, account);
    }

    /// Removes an account
    pub fn remove(&mut self, address: &Address) -> Option<Account> {
        self.accounts.remove(address)
    }

    /// Checks if account exists
    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    /// Balance, zero for a missing account
    pub fn balance(&self, address: &Address) -> Word {
        self.accounts
            .get(address)
            .map(|a| a.balance)
            .unwrap_or(word::ZERO)
    }

    /// Code, empty for a missing account
    pub fn code(&self, address: &Address) -> Bytes {
        self.accounts
            .get(address)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    /// Keccak-256 of the code, zero for a missing account
    pub fn code_hash(&self, address: &Address) -> Word {
        match self.accounts.get(address) {
            Some(account) => keccak256(&account.code).into_bytes(),
            None => word::ZERO,
        }
    }

    /// Adds to a balance (wrapping), creating the account if needed
    pub fn add_balance(&mut self, address: &Address, amount: &Word) {
        let account = self.accounts.entry(*address).or_default();
        account.balance = word::add(&account.balance, amount);
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over accounts in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts.iter()
    }
}

impl FromIterator<(Address, Account)> for WorldState {
    fn from_iter<I: IntoIterator<Item = (Address, Account)>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().collect(),
        }
    }
}
