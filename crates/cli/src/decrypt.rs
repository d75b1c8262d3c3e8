// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::session::Session;
use alloy::primitives::U256;
use anyhow::{anyhow, bail, Result};
use fixn_config::AppConfig;
use fixn_decrypt::{DecryptCard, DecryptStatus, Decryptor, PollPolicy};
use fixn_evm_helpers::contracts::NftRead;
use fixn_utils::Liveness;
use tracing::{info, warn};

pub async fn execute(config: &AppConfig, token_id: u64, retries: u32) -> Result<()> {
    let session = Session::connect(config).await?;
    let token_id = U256::from(token_id);
    let owner = session
        .nft
        .owner_of(token_id)
        .await
        .map_err(|e| anyhow!("{e}"))?;

    let card = DecryptCard::new(token_id, owner);
    let decryptor = Decryptor::new(
        session.nft.clone(),
        session.wallet.clone(),
        session.context.clone(),
        session.contract,
    )
    .with_policy(PollPolicy::from(config.decrypt()));

    let liveness = Liveness::new();
    tokio::spawn({
        let liveness = liveness.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling decrypt");
                liveness.dispose();
            }
        }
    });

    let mut phases = card.subscribe();
    let progress = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            eprintln!("{}", phase.status_line());
        }
    });

    let mut status = card.toggle(&decryptor, &liveness).await;
    let mut remaining = retries;
    while status == DecryptStatus::Pending && remaining > 0 && liveness.is_alive() {
        remaining -= 1;
        info!(%token_id, remaining, "Retrying decrypt");
        status = card.retry(&decryptor, &liveness).await;
    }
    progress.abort();

    match status {
        DecryptStatus::Revealed(traits) => {
            println!("Token #{}: {} ({:?})", token_id, traits, traits.tier());
            Ok(())
        }
        DecryptStatus::Failed { message, .. } => bail!(message),
        other => {
            println!("{}", other.user_message());
            Ok(())
        }
    }
}
