// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use anyhow::{anyhow, bail, Context, Result};
use fixn_cofhe::{CofheContext, HttpCoprocessor, LocalWallet, Wallet};
use fixn_config::{AppConfig, CofheEnvironment};
use fixn_evm_helpers::contracts::{NftContractFactory, NftWriteContract};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a signing command needs, connected to the configured chain
pub struct Session {
    pub wallet: Arc<LocalWallet>,
    pub nft: Arc<NftWriteContract>,
    pub context: Arc<CofheContext>,
    pub contract: Address,
}

impl Session {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let private_key = config
            .private_key()
            .context("No private key configured. Set wallet.private_key in the config file.")?;
        let rpc = config.chain().rpc_url()?;
        if rpc.is_local() && config.cofhe().environment != CofheEnvironment::Local {
            warn!(
                environment = %config.cofhe().environment,
                "Local RPC endpoint with a remote CoFHE environment"
            );
        }
        let rpc_url = rpc.as_http_url()?;
        let contract = config.chain().contracts.nft.parsed_address()?;

        let wallet = LocalWallet::connect(&private_key, &rpc_url).await?;
        let chain_id = wallet.chain_id().await?;
        if let Some(expected) = config.chain().chain_id {
            if chain_id != expected {
                bail!(
                    "Wallet is on chain {} but {} expects chain {}",
                    chain_id,
                    config.chain().name,
                    expected
                );
            }
        }

        let nft = NftContractFactory::create_write(
            &rpc_url,
            contract,
            wallet.private_key_signer().clone(),
        )
        .await
        .map_err(|e| anyhow!("{e}"))?;

        let coprocessor = HttpCoprocessor::from_config(config.cofhe())?;
        info!(
            url = coprocessor.base_url(),
            environment = %config.cofhe().environment,
            "Using CoFHE coprocessor"
        );
        let context = Arc::new(CofheContext::new(
            Arc::new(coprocessor),
            config.cofhe().environment,
        ));

        Ok(Self {
            wallet: Arc::new(wallet),
            nft: Arc::new(nft),
            context,
            contract,
        })
    }

    /// Bind the coprocessor to the wallet
    pub async fn initialize(&self) -> Result<()> {
        self.context.initialize(self.wallet.as_ref()).await?;
        Ok(())
    }

    pub fn account(&self) -> Result<Address> {
        self.wallet
            .address()
            .context("Wallet connector not available")
    }
}
