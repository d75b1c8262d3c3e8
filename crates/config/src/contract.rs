// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A deployed contract, written either as a bare address or as `{ address: ... }`
#[derive(Debug, Clone, Hash, Eq, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Contract {
    Full { address: String },
    AddressOnly(String),
}

impl Contract {
    pub fn address(&self) -> &str {
        match self {
            Contract::Full { address } | Contract::AddressOnly(address) => address,
        }
    }

    pub fn parsed_address(&self) -> Result<Address> {
        self.address()
            .parse()
            .with_context(|| format!("Invalid contract address '{}'", self.address()))
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractAddresses {
    /// The FhenixOGNFT collection contract
    pub nft: Contract,
}
