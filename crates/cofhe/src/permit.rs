// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Self-issued ACL permissions.
//!
//! A permission names the issuer as the only party allowed to read the
//! decrypted values of a contract. It is an EIP-712 `PermissionedV2IssuerSelf`
//! message signed by the issuer, with no recipient and no validator.

use crate::{wallet::TypedDataSigner, CofheError};
use alloy::{
    primitives::Signature,
    sol,
    sol_types::{Eip712Domain, SolStruct},
};
use alloy_primitives::{Address, Bytes, B256, U256};
use fixn_evm_helpers::contracts;
use fixn_utils::{create_shared_rng_from_entropy, hexf, Clock, SharedRng, SystemClock};
use rand::RngCore;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::{borrow::Cow, fmt, sync::Arc, sync::PoisonError};
use tracing::{debug, warn};

sol! {
    /// Field order is part of the signed schema and must not change
    #[derive(Debug, PartialEq, Eq)]
    struct PermissionedV2IssuerSelf {
        address issuer;
        uint64 expiration;
        address recipient;
        uint256 validatorId;
        address validatorContract;
        bytes32 sealingKey;
    }
}

pub const PERMIT_DOMAIN_NAME: &str = "ACL";
pub const PERMIT_DOMAIN_VERSION: &str = "1";
pub const PERMIT_PRIMARY_TYPE: &str = "PermissionedV2IssuerSelf";
/// Thirty days
pub const PERMIT_VALIDITY_SECS: u64 = 30 * 24 * 60 * 60;

pub const PERMIT_FIELDS: [(&str, &str); 6] = [
    ("issuer", "address"),
    ("expiration", "uint64"),
    ("recipient", "address"),
    ("validatorId", "uint256"),
    ("validatorContract", "address"),
    ("sealingKey", "bytes32"),
];

pub fn permit_domain(chain_id: u64, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(PERMIT_DOMAIN_NAME)),
        Some(Cow::Borrowed(PERMIT_DOMAIN_VERSION)),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

/// A signed permission ready to be passed to the `*WithPermission` entry points
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub issuer: Address,
    pub expiration: u64,
    pub recipient: Address,
    pub validator_id: U256,
    pub validator_contract: Address,
    pub sealing_key: B256,
    pub issuer_signature: Bytes,
    /// Always `0x` for self permits
    pub recipient_signature: Bytes,
}

impl fmt::Debug for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permission")
            .field("issuer", &self.issuer)
            .field("expiration", &self.expiration)
            .field("recipient", &self.recipient)
            .field("validator_id", &self.validator_id)
            .field("validator_contract", &self.validator_contract)
            .field("sealing_key", &Hex(self.sealing_key.as_slice()))
            .field("issuer_signature", &Hex(&self.issuer_signature))
            .field("recipient_signature", &Hex(&self.recipient_signature))
            .finish()
    }
}

struct Hex<'a>(&'a [u8]);

impl fmt::Debug for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hexf(self.0, f)
    }
}

impl From<Permission> for contracts::Permission {
    fn from(value: Permission) -> Self {
        contracts::Permission {
            issuer: value.issuer,
            expiration: value.expiration,
            recipient: value.recipient,
            validatorId: value.validator_id,
            validatorContract: value.validator_contract,
            sealingKey: value.sealing_key,
            issuerSignature: value.issuer_signature,
            recipientSignature: value.recipient_signature,
        }
    }
}

/// An unsigned permission together with the domain it will be signed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitRequest {
    pub message: PermissionedV2IssuerSelf,
    pub domain: Eip712Domain,
}

impl PermitRequest {
    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain)
    }

    /// The `eth_signTypedData_v4` document a browser wallet would be shown
    pub fn typed_data(&self) -> Value {
        let fields: Vec<Value> = PERMIT_FIELDS
            .iter()
            .map(|(name, ty)| json!({ "name": name, "type": ty }))
            .collect();
        let mut types = Map::new();
        types.insert(PERMIT_PRIMARY_TYPE.to_string(), Value::Array(fields));
        let chain_id = self
            .domain
            .chain_id
            .map(|id| id.saturating_to::<u64>())
            .unwrap_or_default();
        json!({
            "domain": {
                "name": PERMIT_DOMAIN_NAME,
                "version": PERMIT_DOMAIN_VERSION,
                "chainId": chain_id,
                "verifyingContract": self.domain.verifying_contract.unwrap_or_default(),
            },
            "types": types,
            "primaryType": PERMIT_PRIMARY_TYPE,
            "message": {
                "issuer": self.message.issuer,
                "expiration": self.message.expiration,
                "recipient": self.message.recipient,
                "validatorId": self.message.validatorId.to_string(),
                "validatorContract": self.message.validatorContract,
                "sealingKey": self.message.sealingKey,
            },
        })
    }

    pub fn into_permission(self, signature: &Signature) -> Permission {
        Permission {
            issuer: self.message.issuer,
            expiration: self.message.expiration,
            recipient: self.message.recipient,
            validator_id: self.message.validatorId,
            validator_contract: self.message.validatorContract,
            sealing_key: self.message.sealingKey,
            issuer_signature: Bytes::copy_from_slice(&signature.as_bytes()),
            recipient_signature: Bytes::new(),
        }
    }
}

/// Builds and signs self permits
#[derive(Clone)]
pub struct PermissionIssuer {
    clock: Arc<dyn Clock>,
    rng: SharedRng,
}

impl Default for PermissionIssuer {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), create_shared_rng_from_entropy())
    }
}

impl PermissionIssuer {
    pub fn new(clock: Arc<dyn Clock>, rng: SharedRng) -> Self {
        Self { clock, rng }
    }

    fn sealing_key(&self) -> B256 {
        let mut key = B256::ZERO;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.fill_bytes(key.as_mut_slice());
        key
    }

    /// Assemble the unsigned permission. Draws a fresh sealing key.
    pub fn prepare(
        &self,
        issuer: Address,
        contract: Address,
        chain_id: u64,
    ) -> Result<PermitRequest, CofheError> {
        if issuer.is_zero() {
            return Err(CofheError::Configuration(
                "Issuer address not available for permission creation".to_string(),
            ));
        }
        let expiration = self.clock.now_secs() + PERMIT_VALIDITY_SECS;
        let message = PermissionedV2IssuerSelf {
            issuer,
            expiration,
            recipient: Address::ZERO,
            validatorId: U256::ZERO,
            validatorContract: Address::ZERO,
            sealingKey: self.sealing_key(),
        };
        Ok(PermitRequest {
            message,
            domain: permit_domain(chain_id, contract),
        })
    }

    /// Create and sign a permission for `issuer` over `contract`
    pub async fn create_permission(
        &self,
        issuer: Address,
        contract: Address,
        chain_id: Option<u64>,
        signer: Option<&dyn TypedDataSigner>,
    ) -> Result<Permission, CofheError> {
        let signer = signer.ok_or_else(|| {
            CofheError::Configuration("Signer not available for permission creation".to_string())
        })?;
        let chain_id = chain_id.filter(|id| *id != 0).ok_or_else(|| {
            CofheError::Configuration("Chain ID not available for permission creation".to_string())
        })?;

        let request = self.prepare(issuer, contract, chain_id)?;
        if signer.address() != issuer {
            warn!(
                issuer = %issuer,
                signer = %signer.address(),
                "permission signer differs from issuer, the contract will reject it"
            );
        }

        let signature = signer
            .sign_typed_hash(request.signing_hash())
            .await
            .map_err(|e| CofheError::Signing(e.to_string()))?;
        debug!(
            issuer = %issuer,
            chain_id,
            expiration = request.message.expiration,
            "permission signed"
        );
        Ok(request.into_permission(&signature))
    }
}
