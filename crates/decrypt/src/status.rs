// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{DecryptError, DecryptMode};
use serde::Serialize;
use std::fmt;

/// Plaintext traits of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevealedTraits {
    pub rarity: u32,
    pub attribute: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityTier {
    Common,
    Rare,
    Legendary,
}

impl RevealedTraits {
    pub fn tier(&self) -> RarityTier {
        match self.rarity {
            80.. => RarityTier::Legendary,
            50..=79 => RarityTier::Rare,
            _ => RarityTier::Common,
        }
    }
}

impl fmt::Display for RevealedTraits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rarity {}/100, attribute {}", self.rarity, self.attribute)
    }
}

/// Where a decrypt session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecryptPhase {
    #[default]
    Idle,
    PermitPending,
    Probing,
    Requesting(DecryptMode),
    Polling {
        attempt: u32,
        max_attempts: u32,
    },
    Ready,
    PendingRetry,
    Failed,
}

impl DecryptPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DecryptPhase::Ready | DecryptPhase::PendingRetry | DecryptPhase::Failed
        )
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            DecryptPhase::Idle => "Encrypted",
            DecryptPhase::PermitPending => "Creating permit...",
            DecryptPhase::Probing => "Preparing decrypt...",
            DecryptPhase::Requesting(DecryptMode::Permissioned) => "Submitting decrypt request...",
            DecryptPhase::Requesting(DecryptMode::OwnerOnly) => "Submitting owner decrypt...",
            DecryptPhase::Polling { .. } => "Decrypting...",
            DecryptPhase::Ready => "Decrypted",
            DecryptPhase::PendingRetry => PENDING_MESSAGE,
            DecryptPhase::Failed => "Decryption failed",
        }
    }
}

const PENDING_MESSAGE: &str = "Decrypt still pending. Click to retry.";

/// How a session that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptOutcome {
    Ready(RevealedTraits),
    /// The request is still outstanding on the coprocessor. Not an error.
    Pending { attempts: u32 },
    /// The session was disposed before it finished
    Cancelled,
}

/// What a card shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecryptStatus {
    #[default]
    Encrypted,
    InProgress(DecryptPhase),
    Revealed(RevealedTraits),
    /// Revealed earlier and hidden by the user
    Hidden(RevealedTraits),
    Pending,
    Failed { message: String, retryable: bool },
    Cancelled,
}

impl DecryptStatus {
    pub fn from_result(result: &Result<DecryptOutcome, DecryptError>) -> Self {
        match result {
            Ok(DecryptOutcome::Ready(traits)) => DecryptStatus::Revealed(*traits),
            Ok(DecryptOutcome::Pending { .. }) => DecryptStatus::Pending,
            Ok(DecryptOutcome::Cancelled) => DecryptStatus::Cancelled,
            Err(err) => DecryptStatus::Failed {
                message: err.to_string(),
                retryable: err.is_retryable(),
            },
        }
    }

    /// The line shown next to the decrypt button
    pub fn user_message(&self) -> String {
        match self {
            DecryptStatus::Encrypted | DecryptStatus::Hidden(_) => "Encrypted".to_string(),
            DecryptStatus::InProgress(phase) => phase.status_line().to_string(),
            DecryptStatus::Revealed(traits) => traits.to_string(),
            DecryptStatus::Pending => PENDING_MESSAGE.to_string(),
            DecryptStatus::Failed { message, .. } => message.clone(),
            DecryptStatus::Cancelled => "Decrypt cancelled".to_string(),
        }
    }

    /// Whether the user should be offered another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            DecryptStatus::Pending => true,
            DecryptStatus::Failed { retryable, .. } => *retryable,
            _ => false,
        }
    }
}
