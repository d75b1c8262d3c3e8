// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fixn_cofhe::CofheError;
use fixn_pinning::PinningError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MintError {
    #[error("Connect your wallet to mint.")]
    WalletNotConnected,

    #[error("CoFHE is still initializing. Try again in a moment.")]
    NotInitialized,

    #[error("Please upload an image.")]
    MissingImage,

    #[error("Image size must be less than 5MB.")]
    ImageTooLarge,

    #[error("Please upload a valid image file.")]
    NotAnImage,

    #[error("Please enter an NFT name.")]
    MissingName,

    #[error("Invalid mint price '{0}'")]
    InvalidPrice(String),

    #[error(transparent)]
    Pinning(#[from] PinningError),

    #[error(transparent)]
    Encryption(#[from] CofheError),

    #[error("Mint transaction failed: {0}")]
    Transaction(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error("Failed to load NFTs: {0}")]
    Rpc(String),
}
