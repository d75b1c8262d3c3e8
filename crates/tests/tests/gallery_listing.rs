// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod common;

use anyhow::Result;
use common::{mint_request, Harness};
use fixn_collection::{ViewMode, PLACEHOLDER_IMAGE};
use fixn_test_helpers::StaticWallet;

#[tokio::test]
async fn gallery_lists_minted_tokens_and_filters_by_owner() -> Result<()> {
    let h = Harness::new().initialized().await;
    let stranger = StaticWallet::stranger().account();

    h.nft.insert_token(0, stranger, 10, 1);
    h.minter().mint(mint_request("Genesis", 75.0, 3.0)).await?;
    h.minter().mint(mint_request("Second", 51.0, 2.0)).await?;

    let gallery = h.gallery();
    let all = gallery.list(ViewMode::All, Some(h.owner())).await?;
    let names: Vec<_> = all.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["FIXN OG #0", "Genesis", "Second"]);
    assert_eq!(all[0].image_url, PLACEHOLDER_IMAGE);
    assert_eq!(all[1].image_url, "https://gateway.pinata.cloud/ipfs/QmMock1");
    assert_eq!(
        all[1].description,
        "Genesis - A privacy-preserving NFT from FIXN OG"
    );

    let owned = gallery.list(ViewMode::Owned, Some(h.owner())).await?;
    let ids: Vec<_> = owned.iter().map(|item| item.token_id).collect();
    assert_eq!(ids, vec![1, 2]);

    let disconnected = gallery.list(ViewMode::Owned, None).await?;
    assert_eq!(disconnected.len(), all.len());
    Ok(())
}

#[tokio::test]
async fn empty_collection_lists_nothing() -> Result<()> {
    let h = Harness::new();
    assert!(h.gallery().load().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_metadata_falls_back_to_defaults() -> Result<()> {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    h.nft.set_token_uri(0, "https://example.org/meta/0.json");

    let items = h.gallery().load().await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "FIXN OG #0");
    assert_eq!(items[0].image_url, PLACEHOLDER_IMAGE);
    assert_eq!(items[0].token_uri, "https://example.org/meta/0.json");
    assert!(items[0].description.is_empty());
    Ok(())
}
