//! Wallet / session provider capability.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::error::{Error, Result};

/// Supplies the connected account. Signing happens inside the
/// [`crate::contract::ContractWriter`] backend; the SDK itself never touches
/// key material.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Whether a provider is present at all (the browser-extension
    /// "is MetaMask installed" check in the original environment).
    fn is_available(&self) -> bool;

    /// Ask the provider for the account to act as.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionFailed`] if the user rejects the connection
    /// request or the provider cannot produce an account.
    async fn request_account(&self) -> Result<Address>;
}

/// A wallet with one fixed account — test and CLI sessions.
#[derive(Debug, Clone, Copy)]
pub struct StaticWallet {
    account: Address,
}

impl StaticWallet {
    pub fn new(account: Address) -> Self {
        StaticWallet { account }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    fn is_available(&self) -> bool {
        true
    }

    async fn request_account(&self) -> Result<Address> {
        Ok(self.account)
    }
}

/// The "no provider installed" case, for exercising the unavailable path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWallet;

#[async_trait]
impl WalletProvider for NoWallet {
    fn is_available(&self) -> bool {
        false
    }

    async fn request_account(&self) -> Result<Address> {
        Err(Error::TransactionFailed("no wallet provider found".into()))
    }
}
