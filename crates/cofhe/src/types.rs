// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::{Bytes, U256};
use fixn_evm_helpers::contracts::InEuint32;
use fixn_utils::hexf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ciphertext type tags understood by the coprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FheType {
    Bool = 0,
    Uint8 = 2,
    Uint16 = 3,
    Uint32 = 4,
    Uint64 = 5,
    Uint128 = 6,
    Uint256 = 8,
    Address = 12,
}

impl FheType {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FheType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => FheType::Bool,
            2 => FheType::Uint8,
            3 => FheType::Uint16,
            4 => FheType::Uint32,
            5 => FheType::Uint64,
            6 => FheType::Uint128,
            8 => FheType::Uint256,
            12 => FheType::Address,
            other => return Err(other),
        })
    }
}

/// A plaintext submitted for encryption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryptable {
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
}

impl Encryptable {
    pub fn fhe_type(&self) -> FheType {
        match self {
            Encryptable::Bool(_) => FheType::Bool,
            Encryptable::Uint8(_) => FheType::Uint8,
            Encryptable::Uint16(_) => FheType::Uint16,
            Encryptable::Uint32(_) => FheType::Uint32,
            Encryptable::Uint64(_) => FheType::Uint64,
        }
    }

    /// Decimal rendering used on the wire. Booleans are `0`/`1`.
    pub fn plaintext(&self) -> String {
        match self {
            Encryptable::Bool(v) => u8::from(*v).to_string(),
            Encryptable::Uint8(v) => v.to_string(),
            Encryptable::Uint16(v) => v.to_string(),
            Encryptable::Uint32(v) => v.to_string(),
            Encryptable::Uint64(v) => v.to_string(),
        }
    }
}

/// Opaque handle to a ciphertext held by the coprocessor, plus its proof of input
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedValue {
    pub ct_hash: U256,
    pub security_zone: u8,
    pub utype: u8,
    pub signature: Bytes,
}

impl EncryptedValue {
    /// A zero handle means the coprocessor produced nothing usable
    pub fn is_empty(&self) -> bool {
        self.ct_hash.is_zero()
    }
}

impl fmt::Debug for EncryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedValue")
            .field("ct_hash", &self.ct_hash)
            .field("security_zone", &self.security_zone)
            .field("utype", &self.utype)
            .field("signature", &Signature(&self.signature))
            .finish()
    }
}

struct Signature<'a>(&'a [u8]);

impl fmt::Debug for Signature<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hexf(self.0, f)
    }
}

impl From<EncryptedValue> for InEuint32 {
    fn from(value: EncryptedValue) -> Self {
        InEuint32 {
            ctHash: value.ct_hash,
            securityZone: value.security_zone,
            utype: value.utype,
            signature: value.signature,
        }
    }
}
