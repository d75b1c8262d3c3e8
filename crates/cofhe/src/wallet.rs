// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    primitives::{Address, Signature, B256},
    providers::{Provider, ProviderBuilder},
    signers::{local::PrivateKeySigner, Signer},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Anything that can sign an EIP-712 signing hash on behalf of an account
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    fn address(&self) -> Address;

    async fn sign_typed_hash(&self, hash: B256) -> Result<Signature>;
}

#[async_trait]
impl TypedDataSigner for PrivateKeySigner {
    fn address(&self) -> Address {
        Signer::address(self)
    }

    async fn sign_typed_hash(&self, hash: B256) -> Result<Signature> {
        Ok(self.sign_hash(&hash).await?)
    }
}

/// The connected wallet as seen by the client flows
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Connected account. None while disconnected.
    fn address(&self) -> Option<Address>;

    fn signer(&self) -> Option<Arc<dyn TypedDataSigner>>;

    /// Chain the wallet is currently connected to
    async fn chain_id(&self) -> Result<u64>;
}

/// A wallet backed by a local private key
#[derive(Clone)]
pub struct LocalWallet {
    signer: Arc<PrivateKeySigner>,
    chain_id: u64,
}

impl LocalWallet {
    pub fn new(signer: PrivateKeySigner, chain_id: u64) -> Self {
        Self {
            signer: Arc::new(signer),
            chain_id,
        }
    }

    /// Parse the key and ask the node which chain it serves
    pub async fn connect(private_key: &str, http_rpc_url: &str) -> Result<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .context("Invalid private key")?;
        let provider = ProviderBuilder::new()
            .connect(http_rpc_url)
            .await
            .with_context(|| format!("Could not connect to {http_rpc_url}"))?;
        let chain_id = provider.get_chain_id().await?;
        debug!(chain_id, address = %Signer::address(&signer), "Local wallet connected");
        Ok(Self::new(signer, chain_id))
    }

    pub fn private_key_signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    fn address(&self) -> Option<Address> {
        Some(Signer::address(self.signer.as_ref()))
    }

    fn signer(&self) -> Option<Arc<dyn TypedDataSigner>> {
        Some(self.signer.clone() as Arc<dyn TypedDataSigner>)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }
}
