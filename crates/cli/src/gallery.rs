// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Context, Result};
use fixn_collection::{Gallery, HttpMetadataFetcher, ViewMode};
use fixn_config::AppConfig;
use fixn_evm_helpers::contracts::NftContractFactory;
use fixn_pinning::IpfsGateway;
use fixn_utils::short_address;
use std::sync::Arc;

pub async fn execute(
    config: &AppConfig,
    owned: bool,
    owner: Option<Address>,
    json: bool,
) -> Result<()> {
    let account = match config.private_key() {
        Some(key) => Some(
            key.parse::<PrivateKeySigner>()
                .context("Invalid private key")?
                .address(),
        ),
        None => None,
    };
    let rpc_url = config.chain().rpc_url()?.as_http_url()?;
    let contract = config.chain().contracts.nft.parsed_address()?;
    let nft = NftContractFactory::create_read(&rpc_url, contract, account)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    let gallery = Gallery::new(
        Arc::new(nft),
        Arc::new(HttpMetadataFetcher::new()?),
        IpfsGateway::new(&config.pinning().gateway),
    );
    let (mode, filter_by) = match owner {
        Some(owner) => (ViewMode::Owned, Some(owner)),
        None if owned => (ViewMode::Owned, account),
        None => (ViewMode::All, account),
    };
    let items = gallery.list(mode, filter_by).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("No NFTs found");
        return Ok(());
    }
    for item in items {
        let mine = account == Some(item.owner);
        println!(
            "#{:<4} {:<32} {}{}",
            item.token_id,
            item.name,
            short_address(&item.owner.to_string()),
            if mine { " (yours)" } else { "" }
        );
    }
    Ok(())
}
