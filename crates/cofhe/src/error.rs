// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CofheError {
    /// Signer or chain id missing. The user has to reconnect.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The coprocessor failed to encrypt or returned empty handles
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("CoFHE initialization failed: {0}")]
    Initialization(String),

    #[error("Wallet not available")]
    WalletUnavailable,

    /// The wallet refused or failed to sign
    #[error("Signing failed: {0}")]
    Signing(String),
}
