// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    client::{Coprocessor, WalletBinding},
    encoder::{encode_attributes, EncryptedTraits},
    permit::{Permission, PermissionIssuer},
    wallet::{TypedDataSigner, Wallet},
    CofheError,
};
use alloy_primitives::Address;
use fixn_config::CofheEnvironment;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

struct Session {
    signer: Arc<dyn TypedDataSigner>,
    chain_id: u64,
}

/// Shared coprocessor state for one wallet connection.
///
/// Initialisation happens at most once. Concurrent callers wait on the same
/// in-flight attempt, and a failed attempt leaves the context uninitialised
/// so the next caller tries again.
pub struct CofheContext {
    coprocessor: Arc<dyn Coprocessor>,
    environment: CofheEnvironment,
    session: OnceCell<Session>,
}

impl CofheContext {
    pub fn new(coprocessor: Arc<dyn Coprocessor>, environment: CofheEnvironment) -> Self {
        Self {
            coprocessor,
            environment,
            session: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.session.initialized()
    }

    pub fn coprocessor(&self) -> &Arc<dyn Coprocessor> {
        &self.coprocessor
    }

    pub fn cached_signer(&self) -> Option<Arc<dyn TypedDataSigner>> {
        self.session.get().map(|s| s.signer.clone())
    }

    pub fn cached_chain_id(&self) -> Option<u64> {
        self.session.get().map(|s| s.chain_id)
    }

    /// Bind the coprocessor to the wallet unless already bound
    pub async fn initialize(&self, wallet: &dyn Wallet) -> Result<(), CofheError> {
        self.session
            .get_or_try_init(|| async {
                let account = wallet.address().ok_or(CofheError::WalletUnavailable)?;
                let signer = wallet.signer().ok_or(CofheError::WalletUnavailable)?;
                let chain_id = wallet
                    .chain_id()
                    .await
                    .map_err(|e| CofheError::Configuration(format!("Chain ID unavailable: {e}")))?;

                let binding = WalletBinding::new(account, chain_id, self.environment);
                self.coprocessor
                    .initialize(&binding)
                    .await
                    .map_err(|e| CofheError::Initialization(e.message))?;

                info!(%account, chain_id, environment = %self.environment, "CoFHE initialized");
                Ok::<_, CofheError>(Session { signer, chain_id })
            })
            .await?;
        Ok(())
    }

    /// Create a permission, falling back to the signer and chain id cached at initialisation
    pub async fn get_or_create_permit(
        &self,
        issuer_service: &PermissionIssuer,
        issuer: Address,
        contract: Address,
        chain_id: Option<u64>,
        signer: Option<Arc<dyn TypedDataSigner>>,
    ) -> Result<Permission, CofheError> {
        let signer = signer.or_else(|| self.cached_signer());
        let chain_id = chain_id.or_else(|| self.cached_chain_id());
        issuer_service
            .create_permission(issuer, contract, chain_id, signer.as_deref())
            .await
    }

    /// Encrypt token traits. The context must be initialised.
    pub async fn encrypt_traits(
        &self,
        rarity: f64,
        attribute: f64,
    ) -> Result<EncryptedTraits, CofheError> {
        if !self.is_initialized() {
            return Err(CofheError::Initialization(
                "CoFHE is not initialized".to_string(),
            ));
        }
        encode_attributes(self.coprocessor.as_ref(), rarity, attribute).await
    }
}
