// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

#![allow(dead_code)]

use alloy::primitives::Address;
use anyhow::{bail, Context};
use async_trait::async_trait;
use fixn_cofhe::CofheContext;
use fixn_collection::{Gallery, MetadataFetcher, MintRequest, Minter};
use fixn_config::CofheEnvironment;
use fixn_decrypt::Decryptor;
use fixn_pinning::{ImageFile, IpfsGateway, TokenMetadata};
use fixn_test_helpers::{
    init_test_tracing, MockCoprocessor, MockNft, MockPinning, Pinned, RecordingSleeper,
    StaticWallet, TINY_PNG,
};
use std::sync::Arc;

pub const CONTRACT: Address = Address::repeat_byte(0xc0);

/// One wallet talking to an in-memory collection, coprocessor and pinning service
pub struct Harness {
    pub wallet: StaticWallet,
    pub coprocessor: MockCoprocessor,
    pub nft: MockNft,
    pub pinning: MockPinning,
    pub sleeper: RecordingSleeper,
    pub context: Arc<CofheContext>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_wallet(StaticWallet::owner(), false)
    }

    /// Collection deployed without the permissioned decrypt entry points
    pub fn legacy() -> Self {
        Self::with_wallet(StaticWallet::owner(), true)
    }

    fn with_wallet(wallet: StaticWallet, legacy: bool) -> Self {
        init_test_tracing();
        let coprocessor = MockCoprocessor::new();
        let nft = MockNft::new(wallet.account()).with_coprocessor(coprocessor.clone());
        let nft = if legacy { nft.legacy() } else { nft };
        Self {
            context: context_for(&coprocessor),
            wallet,
            coprocessor,
            nft,
            pinning: MockPinning::new(),
            sleeper: RecordingSleeper::new(),
        }
    }

    /// Bind the coprocessor to the wallet the way the app does on connect
    pub async fn initialized(self) -> Self {
        self.context
            .initialize(&self.wallet)
            .await
            .expect("coprocessor initialises");
        self
    }

    pub fn owner(&self) -> Address {
        self.wallet.account()
    }

    pub fn minter(&self) -> Minter {
        Minter::new(
            Arc::new(self.nft.clone()),
            Arc::new(self.wallet.clone()),
            self.context.clone(),
            Arc::new(self.pinning.clone()),
        )
        .expect("default price parses")
    }

    pub fn decryptor(&self) -> Decryptor {
        self.decryptor_for(self.wallet.clone())
    }

    /// A viewer with its own wallet and coprocessor session on the same collection
    pub fn decryptor_for(&self, wallet: StaticWallet) -> Decryptor {
        let context = if wallet.account() == self.owner() {
            self.context.clone()
        } else {
            context_for(&self.coprocessor)
        };
        Decryptor::new(Arc::new(self.nft.clone()), Arc::new(wallet), context, CONTRACT)
            .with_sleeper(Arc::new(self.sleeper.clone()))
    }

    pub fn gallery(&self) -> Gallery {
        Gallery::new(
            Arc::new(self.nft.clone()),
            Arc::new(PinnedFetcher(self.pinning.clone())),
            IpfsGateway::default(),
        )
    }
}

fn context_for(coprocessor: &MockCoprocessor) -> Arc<CofheContext> {
    Arc::new(CofheContext::new(
        Arc::new(coprocessor.clone()),
        CofheEnvironment::Testnet,
    ))
}

pub fn mint_request(name: &str, rarity: f64, attribute: f64) -> MintRequest {
    MintRequest {
        name: name.to_string(),
        description: None,
        image: Some(ImageFile::new("art.png", "image/png", TINY_PNG.to_vec())),
        rarity,
        attribute,
    }
}

/// Serves metadata straight out of what the mock pinning service stored
pub struct PinnedFetcher(pub MockPinning);

#[async_trait]
impl MetadataFetcher for PinnedFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<TokenMetadata> {
        let index: usize = url
            .rsplit_once("/ipfs/QmMock")
            .context("not a pinned url")?
            .1
            .parse()?;
        match self.0.pinned().get(index.wrapping_sub(1)) {
            Some(Pinned::Json { content, .. }) => Ok(serde_json::from_value(content.clone())?),
            _ => bail!("404 Not Found"),
        }
    }
}
