// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Client side of the CoFHE coprocessor: wallet binding, encryption of trait
//! values and the signed permissions that authorise decryption.

pub mod client;
pub mod context;
pub mod encoder;
mod error;
pub mod permit;
pub mod types;
pub mod wallet;

pub use client::{Coprocessor, CoprocessorFailure, HttpCoprocessor, WalletBinding};
pub use context::CofheContext;
pub use encoder::{clamp_u32, encode_attributes, EncryptedTraits};
pub use error::CofheError;
pub use permit::{Permission, PermissionIssuer, PermitRequest};
pub use types::{Encryptable, EncryptedValue, FheType};
pub use wallet::{LocalWallet, TypedDataSigner, Wallet};
