// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    DecryptCard, DecryptError, DecryptMode, DecryptOutcome, DecryptPhase, PollOutcome, PollPolicy,
    RevealedTraits,
};
use alloy::primitives::{Address, U256};
use fixn_cofhe::{CofheContext, PermissionIssuer, Wallet};
use fixn_evm_helpers::contracts::{DecryptAccess, NftClient, Permission};
use fixn_utils::{Liveness, Sleeper, TokioSleeper};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Runs decrypt sessions against one collection contract
pub struct Decryptor {
    nft: Arc<dyn NftClient>,
    wallet: Arc<dyn Wallet>,
    context: Arc<CofheContext>,
    contract: Address,
    issuer: PermissionIssuer,
    policy: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Decryptor {
    pub fn new(
        nft: Arc<dyn NftClient>,
        wallet: Arc<dyn Wallet>,
        context: Arc<CofheContext>,
        contract: Address,
    ) -> Self {
        Self {
            nft,
            wallet,
            context,
            contract,
            issuer: PermissionIssuer::default(),
            policy: PollPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_issuer(mut self, issuer: PermissionIssuer) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Run one session for `card` from the top.
    ///
    /// The ownership check happens before any network traffic. The only card
    /// state written here is the negotiated mode and the current phase.
    pub async fn decrypt(
        &self,
        card: &DecryptCard,
        liveness: &Liveness,
    ) -> Result<DecryptOutcome, DecryptError> {
        let token_id = card.token_id();
        let caller = self
            .wallet
            .address()
            .ok_or(DecryptError::WalletUnavailable)?;
        if caller != card.owner() {
            return Err(DecryptError::NotOwner {
                caller,
                owner: card.owner(),
            });
        }
        info!(%token_id, %caller, "Decrypt: start");

        if !advance(card, liveness, DecryptPhase::PermitPending) {
            return Ok(DecryptOutcome::Cancelled);
        }
        let permission = self.permit(caller).await?;

        if !advance(card, liveness, DecryptPhase::Probing) {
            return Ok(DecryptOutcome::Cancelled);
        }
        let mode = self.negotiate(card, &permission, liveness).await;

        if !advance(card, liveness, DecryptPhase::Requesting(mode)) {
            return Ok(DecryptOutcome::Cancelled);
        }
        self.request(token_id, mode, &permission).await?;

        let access = mode.access(&permission);
        let access = &access;
        let max_attempts = self.policy.max_attempts;
        let outcome = self
            .policy
            .run(self.sleeper.as_ref(), liveness, move |attempt| {
                card.set_phase(DecryptPhase::Polling {
                    attempt,
                    max_attempts,
                });
                self.read_traits(token_id, access)
            })
            .await?;

        match outcome {
            PollOutcome::Ready { value, attempts } if liveness.is_alive() => {
                card.set_phase(DecryptPhase::Ready);
                info!(%token_id, attempts, "Decrypt: success");
                Ok(DecryptOutcome::Ready(value))
            }
            PollOutcome::Exhausted { attempts } if liveness.is_alive() => {
                card.set_phase(DecryptPhase::PendingRetry);
                info!(%token_id, attempts, "Decrypt: still pending");
                Ok(DecryptOutcome::Pending { attempts })
            }
            _ => Ok(DecryptOutcome::Cancelled),
        }
    }

    async fn permit(&self, caller: Address) -> Result<Permission, DecryptError> {
        let signer = self
            .wallet
            .signer()
            .ok_or(DecryptError::WalletUnavailable)?;
        self.context.initialize(self.wallet.as_ref()).await?;
        let chain_id = self
            .wallet
            .chain_id()
            .await
            .map_err(|e| DecryptError::Configuration(format!("Chain ID unavailable: {e}")))?;

        let permission = self
            .context
            .get_or_create_permit(
                &self.issuer,
                caller,
                self.contract,
                Some(chain_id),
                Some(signer),
            )
            .await?;
        Ok(permission.into())
    }

    /// Reuse the mode negotiated for this card, or probe by simulation
    async fn negotiate(
        &self,
        card: &DecryptCard,
        permission: &Permission,
        liveness: &Liveness,
    ) -> DecryptMode {
        if let Some(mode) = card.mode() {
            debug!(token_id = %card.token_id(), %mode, "using negotiated decrypt mode");
            return mode;
        }

        let probed = match self
            .nft
            .simulate_request_decrypt_all_with_permission(card.token_id(), permission)
            .await
        {
            Ok(()) => DecryptMode::Permissioned,
            Err(e) => {
                warn!(
                    token_id = %card.token_id(),
                    error = %e,
                    "Permissioned decrypt simulation failed, using owner flow"
                );
                DecryptMode::OwnerOnly
            }
        };

        if liveness.is_alive() {
            card.record_mode(probed)
        } else {
            probed
        }
    }

    async fn request(
        &self,
        token_id: U256,
        mode: DecryptMode,
        permission: &Permission,
    ) -> Result<(), DecryptError> {
        let tx = match mode {
            DecryptMode::Permissioned => {
                self.nft
                    .request_decrypt_all_with_permission(token_id, permission.clone())
                    .await
            }
            DecryptMode::OwnerOnly => self.nft.request_decrypt_all(token_id).await,
        }
        .map_err(|e| DecryptError::Transaction(e.to_string()))?;
        info!(%token_id, %mode, %tx, "Decrypt: request confirmed");
        Ok(())
    }

    /// Both fields have to be ready in the same attempt
    async fn read_traits(
        &self,
        token_id: U256,
        access: &DecryptAccess,
    ) -> Result<Option<RevealedTraits>, DecryptError> {
        let rarity = self
            .nft
            .decrypted_rarity(token_id, access)
            .await
            .map_err(|e| DecryptError::Rpc(e.to_string()))?;
        let attribute = self
            .nft
            .decrypted_attribute(token_id, access)
            .await
            .map_err(|e| DecryptError::Rpc(e.to_string()))?;
        trace!(%token_id, ?rarity, ?attribute, "decrypted fields");

        Ok((rarity.ready && attribute.ready).then_some(RevealedTraits {
            rarity: rarity.value,
            attribute: attribute.value,
        }))
    }
}

/// Move to `phase` unless the session was disposed
fn advance(card: &DecryptCard, liveness: &Liveness, phase: DecryptPhase) -> bool {
    if !liveness.is_alive() {
        debug!(token_id = %card.token_id(), ?phase, "session disposed");
        return false;
    }
    card.set_phase(phase);
    true
}
