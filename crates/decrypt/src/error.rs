// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use fixn_cofhe::CofheError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    /// Signer, chain id or coprocessor session missing. The user has to reconnect.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Never retried
    #[error("Only the owner can decrypt NFT attributes.")]
    NotOwner { caller: Address, owner: Address },

    #[error("Wallet connector not available")]
    WalletUnavailable,

    /// Reverted or rejected by the wallet. Not resubmitted automatically.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Could not read decrypted values: {0}")]
    Rpc(String),
}

impl DecryptError {
    /// Ownership rejections stay rejected no matter how often the user clicks
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DecryptError::NotOwner { .. })
    }
}

impl From<CofheError> for DecryptError {
    fn from(value: CofheError) -> Self {
        match value {
            CofheError::Configuration(m) | CofheError::Initialization(m) => {
                DecryptError::Configuration(m)
            }
            CofheError::Encryption(m) => DecryptError::Encryption(m),
            CofheError::WalletUnavailable => DecryptError::WalletUnavailable,
            CofheError::Signing(m) => DecryptError::Transaction(m),
        }
    }
}
