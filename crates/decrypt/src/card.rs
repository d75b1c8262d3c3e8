// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    DecryptError, DecryptMode, DecryptOutcome, DecryptPhase, DecryptStatus, Decryptor,
    RevealedTraits,
};
use alloy::primitives::{Address, U256};
use fixn_utils::Liveness;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info};

#[derive(Debug, Default)]
struct CardState {
    mode: Option<DecryptMode>,
    revealed: Option<RevealedTraits>,
    visible: bool,
    status: DecryptStatus,
}

/// Decrypt state of one token as shown to its viewer.
///
/// The negotiated mode lives here so every session on this token reuses it,
/// while sessions on other tokens stay independent.
#[derive(Debug)]
pub struct DecryptCard {
    token_id: U256,
    owner: Address,
    state: Mutex<CardState>,
    phase: watch::Sender<DecryptPhase>,
    in_flight: tokio::sync::Mutex<()>,
}

impl DecryptCard {
    pub fn new(token_id: U256, owner: Address) -> Self {
        let (phase, _) = watch::channel(DecryptPhase::Idle);
        Self {
            token_id,
            owner,
            state: Mutex::new(CardState::default()),
            phase,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn token_id(&self) -> U256 {
        self.token_id
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owned_by(&self, account: Option<Address>) -> bool {
        account == Some(self.owner)
    }

    pub fn mode(&self) -> Option<DecryptMode> {
        self.state().mode
    }

    pub fn revealed(&self) -> Option<RevealedTraits> {
        self.state().revealed
    }

    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    pub fn status(&self) -> DecryptStatus {
        self.state().status.clone()
    }

    pub fn phase(&self) -> DecryptPhase {
        *self.phase.borrow()
    }

    /// Follow phase changes of sessions on this card
    pub fn subscribe(&self) -> watch::Receiver<DecryptPhase> {
        self.phase.subscribe()
    }

    pub(crate) fn set_phase(&self, phase: DecryptPhase) {
        self.phase.send_replace(phase);
        if !phase.is_terminal() {
            self.state().status = DecryptStatus::InProgress(phase);
        }
    }

    /// Store a probe result. Returns the mode now in force.
    pub(crate) fn record_mode(&self, probed: DecryptMode) -> DecryptMode {
        let mut state = self.state();
        let mode = DecryptMode::merge(state.mode, probed);
        state.mode = Some(mode);
        mode
    }

    /// Hide revealed values, show them again, or run a session if nothing was revealed yet
    pub async fn toggle(&self, decryptor: &Decryptor, liveness: &Liveness) -> DecryptStatus {
        {
            let mut state = self.state();
            if let Some(traits) = state.revealed {
                state.visible = !state.visible;
                state.status = if state.visible {
                    DecryptStatus::Revealed(traits)
                } else {
                    DecryptStatus::Hidden(traits)
                };
                debug!(token_id = %self.token_id, visible = state.visible, "toggled");
                return state.status.clone();
            }
        }
        self.run(decryptor, liveness).await
    }

    /// Run a fresh session from the top, submitting a new decrypt request
    pub async fn retry(&self, decryptor: &Decryptor, liveness: &Liveness) -> DecryptStatus {
        self.run(decryptor, liveness).await
    }

    async fn run(&self, decryptor: &Decryptor, liveness: &Liveness) -> DecryptStatus {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!(token_id = %self.token_id, "decrypt already in flight");
            return self.status();
        };

        let result = decryptor.decrypt(self, liveness).await;
        if !liveness.is_alive() || matches!(result, Ok(DecryptOutcome::Cancelled)) {
            info!(token_id = %self.token_id, "Decrypt: cancelled");
            return DecryptStatus::Cancelled;
        }

        self.settle(result)
    }

    fn settle(&self, result: Result<DecryptOutcome, DecryptError>) -> DecryptStatus {
        let status = DecryptStatus::from_result(&result);
        let mut state = self.state();
        match &result {
            Ok(DecryptOutcome::Ready(traits)) => {
                state.revealed = Some(*traits);
                state.visible = true;
            }
            Ok(_) => {}
            Err(err) => {
                error!(token_id = %self.token_id, error = %err, "Decryption failed");
                self.phase.send_replace(DecryptPhase::Failed);
            }
        }
        state.status = status.clone();
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixn_cofhe::CofheContext;
    use fixn_config::CofheEnvironment;
    use fixn_test_helpers::{MockCoprocessor, MockNft, RecordingSleeper, StaticWallet};
    use std::sync::Arc;

    fn decryptor(nft: &MockNft, wallet: StaticWallet) -> Decryptor {
        let context = Arc::new(CofheContext::new(
            Arc::new(MockCoprocessor::new()),
            CofheEnvironment::Testnet,
        ));
        Decryptor::new(
            Arc::new(nft.clone()),
            Arc::new(wallet),
            context,
            Address::repeat_byte(0xc0),
        )
        .with_sleeper(Arc::new(RecordingSleeper::new()))
    }

    #[tokio::test]
    async fn toggling_revealed_values_needs_no_network() {
        let wallet = StaticWallet::owner();
        let nft = MockNft::new(wallet.account());
        nft.insert_token(0, wallet.account(), 75, 3);
        let decryptor = decryptor(&nft, wallet.clone());
        let card = DecryptCard::new(U256::ZERO, wallet.account());
        let liveness = Liveness::new();

        let traits = RevealedTraits {
            rarity: 75,
            attribute: 3,
        };
        assert_eq!(
            card.toggle(&decryptor, &liveness).await,
            DecryptStatus::Revealed(traits)
        );
        let calls = nft.calls().len();

        assert_eq!(
            card.toggle(&decryptor, &liveness).await,
            DecryptStatus::Hidden(traits)
        );
        assert!(!card.is_visible());
        assert_eq!(
            card.toggle(&decryptor, &liveness).await,
            DecryptStatus::Revealed(traits)
        );
        assert!(card.is_visible());
        assert_eq!(nft.calls().len(), calls);
        assert_eq!(card.phase(), DecryptPhase::Ready);
    }

    #[tokio::test]
    async fn failures_are_reported_as_status() {
        let wallet = StaticWallet::owner();
        let nft = MockNft::new(wallet.account());
        nft.insert_token(0, wallet.account(), 75, 3);
        nft.revert_requests("user rejected transaction");
        let decryptor = decryptor(&nft, wallet.clone());
        let card = DecryptCard::new(U256::ZERO, wallet.account());

        let status = card.toggle(&decryptor, &Liveness::new()).await;
        assert_eq!(
            status,
            DecryptStatus::Failed {
                message: "Transaction failed: user rejected transaction".to_string(),
                retryable: true,
            }
        );
        assert_eq!(card.phase(), DecryptPhase::Failed);
        assert_eq!(card.revealed(), None);
        assert_eq!(card.status(), status);
    }

    #[tokio::test]
    async fn disposed_session_leaves_card_untouched() {
        let wallet = StaticWallet::owner();
        let nft = MockNft::new(wallet.account());
        nft.insert_token(0, wallet.account(), 75, 3);
        let decryptor = decryptor(&nft, wallet.clone());
        let card = DecryptCard::new(U256::ZERO, wallet.account());
        let liveness = Liveness::new();
        liveness.dispose();

        assert_eq!(
            card.toggle(&decryptor, &liveness).await,
            DecryptStatus::Cancelled
        );
        assert_eq!(card.status(), DecryptStatus::Encrypted);
        assert_eq!(card.mode(), None);
        assert!(nft.calls().is_empty());
    }

    #[test]
    fn ownership_check() {
        let card = DecryptCard::new(U256::from(4), Address::repeat_byte(1));
        assert!(card.is_owned_by(Some(Address::repeat_byte(1))));
        assert!(!card.is_owned_by(Some(Address::repeat_byte(2))));
        assert!(!card.is_owned_by(None));
    }
}
