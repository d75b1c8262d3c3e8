// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod common;

use alloy::primitives::U256;
use common::Harness;
use fixn_decrypt::{
    DecryptCard, DecryptMode, DecryptPhase, DecryptStatus, PollPolicy, RevealedTraits,
};
use fixn_test_helpers::{NftCall, RecordingSleeper, StaticWallet};
use fixn_utils::Liveness;
use std::{sync::Arc, time::Duration};

fn simulations(calls: &[NftCall]) -> usize {
    calls
        .iter()
        .filter(|call| matches!(call, NftCall::SimulateDecryptWithPermission(_)))
        .count()
}

#[tokio::test]
async fn legacy_contract_only_sees_owner_requests() {
    let h = Harness::legacy();
    h.nft.insert_token(0, h.owner(), 40, 2);
    let decryptor = h.decryptor();
    let card = DecryptCard::new(U256::ZERO, h.owner());
    let liveness = Liveness::new();
    let traits = RevealedTraits {
        rarity: 40,
        attribute: 2,
    };

    assert_eq!(
        card.toggle(&decryptor, &liveness).await,
        DecryptStatus::Revealed(traits)
    );
    assert_eq!(card.mode(), Some(DecryptMode::OwnerOnly));

    // The downgrade sticks for later sessions on the same card
    assert_eq!(
        card.retry(&decryptor, &liveness).await,
        DecryptStatus::Revealed(traits)
    );
    let calls = h.nft.calls();
    assert_eq!(simulations(&calls), 1);
    assert_eq!(
        h.nft.transactions(),
        vec![
            NftCall::RequestDecrypt(U256::ZERO),
            NftCall::RequestDecrypt(U256::ZERO)
        ]
    );
    assert!(calls.iter().all(|call| !matches!(
        call,
        NftCall::DecryptedRarity {
            permissioned: true,
            ..
        } | NftCall::DecryptedAttribute {
            permissioned: true,
            ..
        }
    )));
}

#[tokio::test]
async fn permissioned_mode_is_reused_without_probing() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 90, 7);
    let decryptor = h.decryptor();
    let card = DecryptCard::new(U256::ZERO, h.owner());
    let liveness = Liveness::new();

    card.toggle(&decryptor, &liveness).await;
    card.retry(&decryptor, &liveness).await;

    assert_eq!(card.mode(), Some(DecryptMode::Permissioned));
    assert_eq!(simulations(&h.nft.calls()), 1);
    assert_eq!(
        card.revealed().map(|traits| traits.tier()),
        Some(fixn_decrypt::RarityTier::Legendary)
    );
}

#[tokio::test]
async fn polling_gives_up_after_twenty_attempts() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    h.nft.never_ready(0);
    let decryptor = h.decryptor();
    let card = DecryptCard::new(U256::ZERO, h.owner());
    let liveness = Liveness::new();

    let status = card.toggle(&decryptor, &liveness).await;
    assert_eq!(status, DecryptStatus::Pending);
    assert_eq!(
        status.user_message(),
        "Decrypt still pending. Click to retry."
    );
    assert!(status.is_retryable());
    assert_eq!(card.phase(), DecryptPhase::PendingRetry);
    assert_eq!(h.nft.rarity_reads(), 20);
    assert_eq!(h.sleeper.sleeps().len(), 20);
    assert_eq!(h.sleeper.total(), Duration::from_secs(30));
    assert_eq!(card.revealed(), None);

    // A retry submits a fresh request and polls again from attempt one
    h.nft.ready_at(0, 1, 1);
    assert_eq!(
        card.retry(&decryptor, &liveness).await,
        DecryptStatus::Revealed(RevealedTraits {
            rarity: 75,
            attribute: 3
        })
    );
    assert_eq!(h.nft.transactions().len(), 2);
}

#[tokio::test]
async fn fields_ready_on_different_attempts_resolve_together() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    h.nft.ready_at(0, 3, 5);
    let card = DecryptCard::new(U256::ZERO, h.owner());

    let status = card.toggle(&h.decryptor(), &Liveness::new()).await;
    assert_eq!(
        status,
        DecryptStatus::Revealed(RevealedTraits {
            rarity: 75,
            attribute: 3
        })
    );
    assert_eq!(h.nft.rarity_reads(), 5);
    assert_eq!(h.sleeper.sleeps().len(), 4);
}

#[tokio::test]
async fn non_owners_are_stopped_before_any_call() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    let card = DecryptCard::new(U256::ZERO, h.owner());

    let status = card
        .toggle(&h.decryptor_for(StaticWallet::stranger()), &Liveness::new())
        .await;
    assert_eq!(
        status,
        DecryptStatus::Failed {
            message: "Only the owner can decrypt NFT attributes.".to_string(),
            retryable: false,
        }
    );
    assert!(!status.is_retryable());
    assert!(h.nft.calls().is_empty());
    assert!(h.coprocessor.bindings().is_empty());

    let status = card
        .toggle(&h.decryptor_for(StaticWallet::disconnected()), &Liveness::new())
        .await;
    assert_eq!(
        status,
        DecryptStatus::Failed {
            message: "Wallet connector not available".to_string(),
            retryable: true,
        }
    );
    assert!(h.nft.calls().is_empty());
}

#[tokio::test]
async fn cancelled_session_stops_polling() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    h.nft.never_ready(0);
    let liveness = Liveness::new();
    let sleeper = RecordingSleeper::new().dispose_after(3, liveness.clone());
    let decryptor = h.decryptor().with_sleeper(Arc::new(sleeper.clone()));
    let card = DecryptCard::new(U256::ZERO, h.owner());

    assert_eq!(
        card.toggle(&decryptor, &liveness).await,
        DecryptStatus::Cancelled
    );
    assert_eq!(h.nft.rarity_reads(), 3);
    assert_eq!(sleeper.sleeps().len(), 3);
    assert_eq!(card.revealed(), None);
    assert!(!card.phase().is_terminal());
}

#[tokio::test]
async fn concurrent_cards_are_independent() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    h.nft.insert_token(1, h.owner(), 20, 9);
    h.nft.never_ready(1);
    let decryptor = h.decryptor().with_policy(PollPolicy {
        max_attempts: 5,
        interval: Duration::from_millis(1500),
    });
    let first = DecryptCard::new(U256::ZERO, h.owner());
    let second = DecryptCard::new(U256::from(1), h.owner());
    let liveness = Liveness::new();

    let (a, b) = tokio::join!(
        first.toggle(&decryptor, &liveness),
        second.toggle(&decryptor, &liveness)
    );
    assert_eq!(
        a,
        DecryptStatus::Revealed(RevealedTraits {
            rarity: 75,
            attribute: 3
        })
    );
    assert_eq!(b, DecryptStatus::Pending);
    assert_eq!(second.revealed(), None);
    assert_eq!(first.mode(), Some(DecryptMode::Permissioned));
    assert_eq!(second.mode(), Some(DecryptMode::Permissioned));
}

#[tokio::test]
async fn double_click_submits_one_request() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    h.nft.ready_at(0, 2, 2);
    let decryptor = h.decryptor();
    let card = DecryptCard::new(U256::ZERO, h.owner());
    let liveness = Liveness::new();

    let (first, second) = tokio::join!(
        card.toggle(&decryptor, &liveness),
        card.toggle(&decryptor, &liveness)
    );
    assert!(matches!(first, DecryptStatus::Revealed(_)));
    assert!(matches!(second, DecryptStatus::InProgress(_)));
    assert_eq!(h.nft.transactions().len(), 1);
}

#[tokio::test]
async fn wallets_that_cannot_sign_or_report_a_chain_fail_cleanly() {
    let h = Harness::new();
    h.nft.insert_token(0, h.owner(), 75, 3);
    let card = DecryptCard::new(U256::ZERO, h.owner());

    let status = card
        .toggle(
            &h.decryptor_for(StaticWallet::owner().without_signer()),
            &Liveness::new(),
        )
        .await;
    assert_eq!(
        status,
        DecryptStatus::Failed {
            message: "Wallet connector not available".to_string(),
            retryable: true,
        }
    );

    let status = card
        .toggle(
            &h.decryptor_for(StaticWallet::owner().without_chain()),
            &Liveness::new(),
        )
        .await;
    let DecryptStatus::Failed { message, .. } = status else {
        panic!("expected a failure, got {status:?}");
    };
    assert!(message.contains("Chain ID unavailable"));
    assert!(h.nft.transactions().is_empty());
    assert!(!h.context.is_initialized());
}
