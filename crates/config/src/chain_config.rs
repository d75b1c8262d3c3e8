// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{contract::ContractAddresses, rpc::RPC};
use anyhow::*;
use serde::{Deserialize, Serialize};

pub const SEPOLIA_CHAIN_ID: u64 = 11155111;
pub const FHENIX_TESTNET_CHAIN_ID: u64 = 42069;

#[derive(Debug, Clone, PartialEq, Hash, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
    pub name: String,
    pub rpc_url: String,
    pub contracts: ContractAddresses,
    /// Expected chain id. When set the wallet's network must match it.
    pub chain_id: Option<u64>,
    /// Block explorer used when printing transaction links
    pub explorer_url: Option<String>,
}

impl ChainConfig {
    pub fn rpc_url(&self) -> Result<RPC> {
        RPC::from_url(&self.rpc_url)
            .map_err(|e| anyhow!("Failed to parse RPC URL for chain {}: {}", self.name, e))
    }

    /// Link to a transaction on the configured explorer, if there is one
    pub fn tx_link(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }

    pub fn is_sepolia(&self) -> bool {
        self.chain_id == Some(SEPOLIA_CHAIN_ID)
    }
}

/// Networks the collection has been deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPreset {
    Sepolia,
    FhenixTestnet,
}

impl ChainPreset {
    pub fn chain_id(&self) -> u64 {
        match self {
            ChainPreset::Sepolia => SEPOLIA_CHAIN_ID,
            ChainPreset::FhenixTestnet => FHENIX_TESTNET_CHAIN_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainPreset::Sepolia => "sepolia",
            ChainPreset::FhenixTestnet => "fhenix-testnet",
        }
    }

    pub fn public_rpc_url(&self) -> &'static str {
        match self {
            ChainPreset::Sepolia => "https://rpc.sepolia.org",
            ChainPreset::FhenixTestnet => "https://api.helium.fhenix.zone",
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            ChainPreset::Sepolia => "https://sepolia.etherscan.io",
            ChainPreset::FhenixTestnet => "https://explorer.helium.fhenix.zone",
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            SEPOLIA_CHAIN_ID => Some(ChainPreset::Sepolia),
            FHENIX_TESTNET_CHAIN_ID => Some(ChainPreset::FhenixTestnet),
            _ => None,
        }
    }
}

pub fn is_sepolia_testnet(chain_id: u64) -> bool {
    chain_id == SEPOLIA_CHAIN_ID
}
