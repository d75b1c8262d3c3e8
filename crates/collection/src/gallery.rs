// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::GalleryError;
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use fixn_evm_helpers::{
    contracts::NftRead,
    retry::{call_with_retry, TRANSIENT_RPC_ERRORS},
};
use fixn_pinning::{IpfsGateway, TokenMetadata};
use futures::future::join_all;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

pub const PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/400x400/111111/ffffff?text=FIXN+OG";

const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub token_id: u64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub owner: Address,
    pub token_uri: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    All,
    Owned,
}

/// Resolves a token uri into its metadata document
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<TokenMetadata>;
}

pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

impl HttpMetadataFetcher {
    pub fn new() -> Result<Self, GalleryError> {
        let client = reqwest::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .build()
            .map_err(|e| GalleryError::Rpc(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<TokenMetadata> {
        let metadata = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<TokenMetadata>()
            .await?;
        Ok(metadata)
    }
}

pub struct Gallery {
    nft: Arc<dyn NftRead>,
    fetcher: Arc<dyn MetadataFetcher>,
    gateway: IpfsGateway,
}

impl Gallery {
    pub fn new(
        nft: Arc<dyn NftRead>,
        fetcher: Arc<dyn MetadataFetcher>,
        gateway: IpfsGateway,
    ) -> Self {
        Self {
            nft,
            fetcher,
            gateway,
        }
    }

    /// Every minted token, in id order. Tokens whose owner cannot be read are skipped.
    pub async fn load(&self) -> Result<Vec<GalleryItem>, GalleryError> {
        let supply = call_with_retry("getCurrentSupply", TRANSIENT_RPC_ERRORS, || {
            self.nft.current_supply()
        })
        .await
        .map_err(|e| GalleryError::Rpc(e.to_string()))?;
        let supply: u64 = supply.saturating_to();
        debug!(supply, "Loading gallery");

        let items = join_all((0..supply).map(|token_id| self.load_item(token_id))).await;
        Ok(items.into_iter().flatten().collect())
    }

    /// Load then filter for the given view
    pub async fn list(
        &self,
        mode: ViewMode,
        account: Option<Address>,
    ) -> Result<Vec<GalleryItem>, GalleryError> {
        Ok(filter(self.load().await?, mode, account))
    }

    async fn load_item(&self, token_id: u64) -> Option<GalleryItem> {
        let id = U256::from(token_id);
        let (owner, token_uri) = futures::join!(
            call_with_retry("ownerOf", TRANSIENT_RPC_ERRORS, || self.nft.owner_of(id)),
            call_with_retry("tokenURI", TRANSIENT_RPC_ERRORS, || self.nft.token_uri(id)),
        );
        let owner = match owner {
            Ok(owner) => owner,
            Err(e) => {
                warn!(token_id, "Skipping token without owner: {e}");
                return None;
            }
        };
        let token_uri = token_uri.unwrap_or_else(|e| {
            warn!(token_id, "Could not read token uri: {e}");
            String::new()
        });

        let metadata = self.metadata(token_id, &token_uri).await;
        let name = non_empty(metadata.name).unwrap_or_else(|| format!("FIXN OG #{token_id}"));
        let image_url = non_empty(metadata.image)
            .map(|image| self.gateway.normalize(&image))
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

        Some(GalleryItem {
            token_id,
            name,
            description: metadata.description,
            image_url,
            owner,
            token_uri,
        })
    }

    async fn metadata(&self, token_id: u64, token_uri: &str) -> TokenMetadata {
        if token_uri.is_empty() {
            return TokenMetadata::default();
        }
        let url = self.gateway.normalize(token_uri);
        match self.fetcher.fetch(&url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(token_id, url = %url, "Metadata unavailable: {e}");
                TokenMetadata::default()
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

/// `Owned` only narrows the list once an account is connected
pub fn filter(
    items: Vec<GalleryItem>,
    mode: ViewMode,
    account: Option<Address>,
) -> Vec<GalleryItem> {
    match (mode, account) {
        (ViewMode::Owned, Some(account)) => {
            items.into_iter().filter(|i| i.owner == account).collect()
        }
        (ViewMode::Owned, None) => {
            debug!("No connected account, showing every token");
            items
        }
        (ViewMode::All, _) => items,
    }
}
