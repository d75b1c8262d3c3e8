// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::tx_display;
use crate::session::Session;
use alloy::primitives::utils::format_ether;
use anyhow::Result;
use fixn_collection::{parse_mint_price, MintRequest, Minter};
use fixn_config::AppConfig;
use fixn_pinning::{ImageFile, PinataClient};
use std::{path::PathBuf, sync::Arc};

pub async fn execute(
    config: &AppConfig,
    name: String,
    description: Option<String>,
    image: PathBuf,
    rarity: f64,
    attribute: f64,
) -> Result<()> {
    let image = ImageFile::from_path(&image)?;
    let pinning = PinataClient::from_config(config.pinning())?;
    let price = parse_mint_price(&config.mint().price)?;

    let session = Session::connect(config).await?;
    session.initialize().await?;

    let minter = Minter::new(
        session.nft.clone(),
        session.wallet.clone(),
        session.context.clone(),
        Arc::new(pinning),
    )?
    .with_price(price);

    println!("Minting {} for {} ETH...", name, format_ether(price));
    let outcome = minter
        .mint(MintRequest {
            name,
            description,
            image: Some(image),
            rarity,
            attribute,
        })
        .await?;

    println!("NFT minted successfully!");
    if let Some(token_id) = outcome.token_id {
        println!("Token id: {}", token_id);
    }
    println!("Metadata: {}", outcome.metadata.metadata_url);
    println!(
        "Transaction: {}",
        tx_display(config, &outcome.tx_hash.to_string())
    );
    Ok(())
}
