// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::MintError;
use alloy::primitives::{utils::parse_ether, TxHash, U256};
use fixn_cofhe::{clamp_u32, CofheContext, Wallet};
use fixn_evm_helpers::contracts::NftClient;
use fixn_pinning::{
    ipfs_uri, upload_nft_metadata, ImageFile, PinningService, TraitAttribute, UploadedMetadata,
    MAX_IMAGE_BYTES,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_MINT_PRICE: &str = "0.001";

/// What the user filled in on the mint form
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<ImageFile>,
    pub rarity: f64,
    pub attribute: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintOutcome {
    pub tx_hash: TxHash,
    /// None when the receipt carried no mint event
    pub token_id: Option<U256>,
    pub token_uri: String,
    pub metadata: UploadedMetadata,
}

pub fn parse_mint_price(price: &str) -> Result<U256, MintError> {
    parse_ether(price.trim()).map_err(|_| MintError::InvalidPrice(price.to_string()))
}

/// Validates, pins, encrypts and mints
pub struct Minter {
    nft: Arc<dyn NftClient>,
    wallet: Arc<dyn Wallet>,
    context: Arc<CofheContext>,
    pinning: Arc<dyn PinningService>,
    price: U256,
}

impl Minter {
    pub fn new(
        nft: Arc<dyn NftClient>,
        wallet: Arc<dyn Wallet>,
        context: Arc<CofheContext>,
        pinning: Arc<dyn PinningService>,
    ) -> Result<Self, MintError> {
        Ok(Self {
            nft,
            wallet,
            context,
            pinning,
            price: parse_mint_price(DEFAULT_MINT_PRICE)?,
        })
    }

    pub fn with_price(mut self, price: U256) -> Self {
        self.price = price;
        self
    }

    pub fn price(&self) -> U256 {
        self.price
    }

    /// Check the form in the order the user would fix it
    fn validate(&self, request: &MintRequest) -> Result<(), MintError> {
        if self.wallet.address().is_none() {
            return Err(MintError::WalletNotConnected);
        }
        if !self.context.is_initialized() {
            return Err(MintError::NotInitialized);
        }
        let image = request.image.as_ref().ok_or(MintError::MissingImage)?;
        if image.len() > MAX_IMAGE_BYTES {
            return Err(MintError::ImageTooLarge);
        }
        if !image.is_image() {
            return Err(MintError::NotAnImage);
        }
        if request.name.trim().is_empty() {
            return Err(MintError::MissingName);
        }
        Ok(())
    }

    pub async fn mint(&self, request: MintRequest) -> Result<MintOutcome, MintError> {
        self.validate(&request)?;
        let MintRequest {
            name,
            description,
            image,
            rarity,
            attribute,
        } = request;
        let image = image.ok_or(MintError::MissingImage)?;
        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("{name} - A privacy-preserving NFT from FIXN OG"));

        info!(name = %name, "Uploading metadata to IPFS...");
        let attributes = vec![
            TraitAttribute::number("Rarity", clamp_u32(rarity).into()),
            TraitAttribute::number("Special Attribute", clamp_u32(attribute).into()),
        ];
        let metadata = upload_nft_metadata(
            self.pinning.as_ref(),
            &name,
            &description,
            image,
            attributes,
        )
        .await?;

        info!("Encrypting attributes with CoFHE...");
        let traits = self.context.encrypt_traits(rarity, attribute).await?;

        info!("Submitting mint transaction...");
        let token_uri = ipfs_uri(&metadata.metadata_hash);
        let receipt = self
            .nft
            .mint(
                traits.rarity.into(),
                traits.attribute.into(),
                token_uri.clone(),
                self.price,
            )
            .await
            .map_err(|e| MintError::Transaction(e.to_string()))?;

        info!(
            tx = %receipt.tx_hash,
            token_id = ?receipt.token_id,
            metadata_hash = %metadata.metadata_hash,
            "Mint confirmed"
        );
        Ok(MintOutcome {
            tx_hash: receipt.tx_hash,
            token_id: receipt.token_id,
            token_uri,
            metadata,
        })
    }
}
