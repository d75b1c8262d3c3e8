// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod common;

use alloy::primitives::U256;
use anyhow::Result;
use common::{mint_request, Harness};
use fixn_cofhe::CofheError;
use fixn_collection::MintError;
use fixn_decrypt::{DecryptCard, DecryptMode, DecryptStatus, RevealedTraits};
use fixn_pinning::PinningError;
use fixn_test_helpers::{NftCall, Pinned};
use fixn_utils::Liveness;

#[tokio::test]
async fn minted_traits_are_revealed_to_the_owner() -> Result<()> {
    let h = Harness::new().initialized().await;

    let outcome = h.minter().mint(mint_request("Genesis", 75.0, 3.0)).await?;
    assert_eq!(outcome.token_id, Some(U256::ZERO));
    assert_eq!(outcome.token_uri, "ipfs://QmMock2");
    h.nft.ready_at(0, 2, 2);

    let card = DecryptCard::new(U256::ZERO, h.owner());
    let decryptor = h.decryptor();
    let liveness = Liveness::new();
    let traits = RevealedTraits {
        rarity: 75,
        attribute: 3,
    };

    assert_eq!(
        card.toggle(&decryptor, &liveness).await,
        DecryptStatus::Revealed(traits)
    );
    assert_eq!(card.mode(), Some(DecryptMode::Permissioned));
    assert_eq!(h.nft.rarity_reads(), 2);
    assert_eq!(h.sleeper.sleeps().len(), 1);

    let txs = h.nft.transactions();
    assert_eq!(txs.len(), 2);
    assert!(matches!(&txs[0], NftCall::Mint { token_uri, .. } if token_uri == "ipfs://QmMock2"));
    assert_eq!(txs[1], NftCall::RequestDecryptWithPermission(U256::ZERO));

    // Hiding and showing again is local only
    let calls = h.nft.calls().len();
    assert_eq!(
        card.toggle(&decryptor, &liveness).await,
        DecryptStatus::Hidden(traits)
    );
    assert_eq!(
        card.toggle(&decryptor, &liveness).await,
        DecryptStatus::Revealed(traits)
    );
    assert_eq!(h.nft.calls().len(), calls);
    assert_eq!(h.coprocessor.bindings().len(), 1);
    Ok(())
}

#[tokio::test]
async fn out_of_range_traits_are_clamped_before_encryption() -> Result<()> {
    let h = Harness::new().initialized().await;
    let minter = h.minter();

    minter.mint(mint_request("Edges", -5.0, 5e9)).await?;
    minter.mint(mint_request("Fraction", 12.7, 12.7)).await?;

    let minted = h.nft.minted();
    let plaintexts: Vec<_> = minted
        .iter()
        .map(|(rarity, attribute)| {
            (
                h.coprocessor.plaintext_of(rarity.ctHash),
                h.coprocessor.plaintext_of(attribute.ctHash),
            )
        })
        .collect();
    assert_eq!(
        plaintexts,
        vec![
            (Some(0), Some(u32::MAX as u64)),
            (Some(12), Some(12)),
        ]
    );

    let Pinned::Json { content, .. } = &h.pinning.pinned()[1] else {
        panic!("metadata json should follow the image");
    };
    assert_eq!(content["attributes"][0]["trait_type"], "Rarity");
    assert_eq!(content["attributes"][0]["value"], 0);
    assert_eq!(content["attributes"][1]["trait_type"], "Special Attribute");
    assert_eq!(content["attributes"][1]["value"], u32::MAX);

    let card = DecryptCard::new(U256::ZERO, h.owner());
    assert_eq!(
        card.toggle(&h.decryptor(), &Liveness::new()).await,
        DecryptStatus::Revealed(RevealedTraits {
            rarity: 0,
            attribute: u32::MAX
        })
    );
    Ok(())
}

#[tokio::test]
async fn encryption_failures_never_reach_the_contract() {
    let h = Harness::new().initialized().await;
    h.coprocessor.fail_encrypt("zk verifier unavailable");

    let err = h
        .minter()
        .mint(mint_request("Genesis", 75.0, 3.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::Encryption(CofheError::Encryption(_))));
    assert!(h.nft.transactions().is_empty());

    let h = Harness::new().initialized().await;
    h.coprocessor.return_empty_handles();
    let err = h
        .minter()
        .mint(mint_request("Genesis", 75.0, 3.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::Encryption(CofheError::Encryption(_))));
    assert!(h.nft.transactions().is_empty());
}

#[tokio::test]
async fn pinning_rejection_stops_before_encryption() {
    let h = Harness::new().initialized().await;
    h.pinning.reject(401, "Unauthorized");

    let err = h
        .minter()
        .mint(mint_request("Genesis", 75.0, 3.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MintError::Pinning(PinningError::Api { status: 401, .. })
    ));
    assert!(h.coprocessor.batches().is_empty());
    assert!(h.nft.transactions().is_empty());
}

#[tokio::test]
async fn minting_requires_an_initialized_session() {
    let h = Harness::new();
    let err = h
        .minter()
        .mint(mint_request("Genesis", 75.0, 3.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::NotInitialized));
    assert!(h.pinning.pinned().is_empty());
}
