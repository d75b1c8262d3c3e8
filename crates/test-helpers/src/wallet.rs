// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use async_trait::async_trait;
use fixn_cofhe::{TypedDataSigner, Wallet};
use std::sync::Arc;

pub const SEPOLIA: u64 = 11155111;

// Anvil development keys
pub const OWNER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const STRANGER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub fn signer_from(key: &str) -> PrivateKeySigner {
    key.parse().unwrap()
}

/// A wallet whose connection state is fixed up front
#[derive(Clone)]
pub struct StaticWallet {
    address: Option<Address>,
    signer: Option<Arc<PrivateKeySigner>>,
    chain_id: Option<u64>,
}

impl StaticWallet {
    pub fn from_key(key: &str, chain_id: u64) -> Self {
        let signer = signer_from(key);
        Self {
            address: Some(signer.address()),
            signer: Some(Arc::new(signer)),
            chain_id: Some(chain_id),
        }
    }

    pub fn owner() -> Self {
        Self::from_key(OWNER_KEY, SEPOLIA)
    }

    pub fn stranger() -> Self {
        Self::from_key(STRANGER_KEY, SEPOLIA)
    }

    pub fn disconnected() -> Self {
        Self {
            address: None,
            signer: None,
            chain_id: None,
        }
    }

    /// Account is known but no signer can be reached
    pub fn without_signer(self) -> Self {
        Self {
            signer: None,
            ..self
        }
    }

    /// The network query fails
    pub fn without_chain(self) -> Self {
        Self {
            chain_id: None,
            ..self
        }
    }

    pub fn account(&self) -> Address {
        self.address.unwrap_or_default()
    }
}

#[async_trait]
impl Wallet for StaticWallet {
    fn address(&self) -> Option<Address> {
        self.address
    }

    fn signer(&self) -> Option<Arc<dyn TypedDataSigner>> {
        self.signer
            .clone()
            .map(|signer| signer as Arc<dyn TypedDataSigner>)
    }

    async fn chain_id(&self) -> anyhow::Result<u64> {
        self.chain_id
            .ok_or_else(|| anyhow::anyhow!("network unavailable"))
    }
}
