// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::MockCoprocessor;
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use eyre::{bail, Result};
use fixn_evm_helpers::contracts::{
    DecryptAccess, DecryptedField, InEuint32, MintReceipt, NftRead, NftWrite, Permission,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

/// Every contract interaction the mock saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NftCall {
    OwnerOf(U256),
    TokenUri(U256),
    CurrentSupply,
    DecryptedRarity { token_id: U256, permissioned: bool },
    DecryptedAttribute { token_id: U256, permissioned: bool },
    Mint { token_uri: String, value: U256 },
    SimulateDecryptWithPermission(U256),
    RequestDecryptWithPermission(U256),
    RequestDecrypt(U256),
}

impl NftCall {
    /// Calls that would be broadcast as transactions
    pub fn is_transaction(&self) -> bool {
        matches!(
            self,
            NftCall::Mint { .. }
                | NftCall::RequestDecryptWithPermission(_)
                | NftCall::RequestDecrypt(_)
        )
    }
}

#[derive(Debug, Clone)]
struct Token {
    owner: Address,
    uri: String,
    rarity: u32,
    attribute: u32,
    /// Read attempt (counted from the last decrypt request) from which the field is ready
    rarity_ready_at: u32,
    attribute_ready_at: u32,
    rarity_reads: u32,
    attribute_reads: u32,
    decrypt_requested: bool,
}

#[derive(Default)]
struct State {
    account: Address,
    tokens: BTreeMap<U256, Token>,
    calls: Vec<NftCall>,
    minted: Vec<(InEuint32, InEuint32)>,
    legacy_contract: bool,
    revert_requests: Option<String>,
    fail_reads: Option<String>,
    fail_uri: Option<String>,
    tx_count: u64,
}

impl State {
    fn token(&self, token_id: U256) -> Result<&Token> {
        match self.tokens.get(&token_id) {
            Some(token) => Ok(token),
            None => bail!("execution reverted: ERC721NonexistentToken({token_id})"),
        }
    }

    fn token_mut(&mut self, token_id: U256) -> Result<&mut Token> {
        match self.tokens.get_mut(&token_id) {
            Some(token) => Ok(token),
            None => bail!("execution reverted: ERC721NonexistentToken({token_id})"),
        }
    }

    fn next_tx(&mut self) -> TxHash {
        self.tx_count += 1;
        TxHash::from(U256::from(self.tx_count).to_be_bytes::<32>())
    }

    fn check_permission(&self, token_id: U256, access: &DecryptAccess) -> Result<()> {
        if let DecryptAccess::Permission(permission) = access {
            if self.legacy_contract {
                bail!("execution reverted: function selector was not recognized");
            }
            let token = self.token(token_id)?;
            if permission.issuer != token.owner {
                bail!("execution reverted: InvalidPermission");
            }
        }
        Ok(())
    }
}

/// In-memory stand-in for the collection contract.
///
/// Decryption results become ready after a scripted number of read attempts
/// following the most recent decrypt request.
#[derive(Clone)]
pub struct MockNft {
    state: Arc<Mutex<State>>,
    coprocessor: Option<MockCoprocessor>,
}

impl MockNft {
    /// `account` is the sender used for writes
    pub fn new(account: Address) -> Self {
        let state = State {
            account,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            coprocessor: None,
        }
    }

    /// Resolve minted ciphertexts through this coprocessor
    pub fn with_coprocessor(mut self, coprocessor: MockCoprocessor) -> Self {
        self.coprocessor = Some(coprocessor);
        self
    }

    /// Deployment without the permissioned entry points
    pub fn legacy(self) -> Self {
        self.state.lock().unwrap().legacy_contract = true;
        self
    }

    pub fn insert_token(&self, token_id: u64, owner: Address, rarity: u32, attribute: u32) {
        self.state.lock().unwrap().tokens.insert(
            U256::from(token_id),
            Token {
                owner,
                uri: format!("ipfs://QmToken{token_id}"),
                rarity,
                attribute,
                rarity_ready_at: 1,
                attribute_ready_at: 1,
                rarity_reads: 0,
                attribute_reads: 0,
                decrypt_requested: false,
            },
        );
    }

    pub fn set_token_uri(&self, token_id: u64, uri: &str) {
        if let Some(token) = self.state.lock().unwrap().tokens.get_mut(&U256::from(token_id)) {
            token.uri = uri.to_string();
        }
    }

    /// Make each field ready from the given poll attempt onwards
    pub fn ready_at(&self, token_id: u64, rarity_attempt: u32, attribute_attempt: u32) {
        if let Some(token) = self.state.lock().unwrap().tokens.get_mut(&U256::from(token_id)) {
            token.rarity_ready_at = rarity_attempt;
            token.attribute_ready_at = attribute_attempt;
        }
    }

    pub fn never_ready(&self, token_id: u64) {
        self.ready_at(token_id, u32::MAX, u32::MAX);
    }

    pub fn revert_requests(&self, reason: &str) {
        self.state.lock().unwrap().revert_requests = Some(reason.to_string());
    }

    pub fn fail_reads(&self, reason: &str) {
        self.state.lock().unwrap().fail_reads = Some(reason.to_string());
    }

    pub fn fail_token_uri(&self, reason: &str) {
        self.state.lock().unwrap().fail_uri = Some(reason.to_string());
    }

    pub fn calls(&self) -> Vec<NftCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn transactions(&self) -> Vec<NftCall> {
        self.calls().into_iter().filter(NftCall::is_transaction).collect()
    }

    pub fn rarity_reads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, NftCall::DecryptedRarity { .. }))
            .count()
    }

    pub fn minted(&self) -> Vec<(InEuint32, InEuint32)> {
        self.state.lock().unwrap().minted.clone()
    }

    pub fn owner(&self, token_id: u64) -> Option<Address> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .get(&U256::from(token_id))
            .map(|token| token.owner)
    }

    fn plaintext(&self, input: &InEuint32) -> u32 {
        self.coprocessor
            .as_ref()
            .and_then(|c| c.plaintext_of(input.ctHash))
            .map(|value| value as u32)
            .unwrap_or_default()
    }
}

#[async_trait]
impl NftRead for MockNft {
    async fn owner_of(&self, token_id: U256) -> Result<Address> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::OwnerOf(token_id));
        Ok(state.token(token_id)?.owner)
    }

    async fn token_uri(&self, token_id: U256) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::TokenUri(token_id));
        if let Some(reason) = &state.fail_uri {
            bail!("{reason}");
        }
        Ok(state.token(token_id)?.uri.clone())
    }

    async fn current_supply(&self) -> Result<U256> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::CurrentSupply);
        Ok(U256::from(state.tokens.len()))
    }

    async fn decrypted_rarity(
        &self,
        token_id: U256,
        access: &DecryptAccess,
    ) -> Result<DecryptedField> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::DecryptedRarity {
            token_id,
            permissioned: matches!(access, DecryptAccess::Permission(_)),
        });
        if let Some(reason) = &state.fail_reads {
            bail!("{reason}");
        }
        state.check_permission(token_id, access)?;
        let token = state.token_mut(token_id)?;
        token.rarity_reads += 1;
        if token.decrypt_requested && token.rarity_reads >= token.rarity_ready_at {
            Ok(DecryptedField::ready(token.rarity))
        } else {
            Ok(DecryptedField::pending())
        }
    }

    async fn decrypted_attribute(
        &self,
        token_id: U256,
        access: &DecryptAccess,
    ) -> Result<DecryptedField> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::DecryptedAttribute {
            token_id,
            permissioned: matches!(access, DecryptAccess::Permission(_)),
        });
        if let Some(reason) = &state.fail_reads {
            bail!("{reason}");
        }
        state.check_permission(token_id, access)?;
        let token = state.token_mut(token_id)?;
        token.attribute_reads += 1;
        if token.decrypt_requested && token.attribute_reads >= token.attribute_ready_at {
            Ok(DecryptedField::ready(token.attribute))
        } else {
            Ok(DecryptedField::pending())
        }
    }
}

#[async_trait]
impl NftWrite for MockNft {
    fn account(&self) -> Address {
        self.state.lock().unwrap().account
    }

    async fn mint(
        &self,
        encrypted_rarity: InEuint32,
        encrypted_attribute: InEuint32,
        token_uri: String,
        value: U256,
    ) -> Result<MintReceipt> {
        let rarity = self.plaintext(&encrypted_rarity);
        let attribute = self.plaintext(&encrypted_attribute);
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::Mint {
            token_uri: token_uri.clone(),
            value,
        });
        if let Some(reason) = &state.revert_requests {
            bail!("{reason}");
        }

        let token_id = U256::from(state.tokens.len());
        let owner = state.account;
        state.tokens.insert(
            token_id,
            Token {
                owner,
                uri: token_uri,
                rarity,
                attribute,
                rarity_ready_at: 1,
                attribute_ready_at: 1,
                rarity_reads: 0,
                attribute_reads: 0,
                decrypt_requested: false,
            },
        );
        state.minted.push((encrypted_rarity, encrypted_attribute));
        Ok(MintReceipt {
            tx_hash: state.next_tx(),
            token_id: Some(token_id),
        })
    }

    async fn simulate_request_decrypt_all_with_permission(
        &self,
        token_id: U256,
        permission: &Permission,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::SimulateDecryptWithPermission(token_id));
        state.check_permission(token_id, &DecryptAccess::Permission(permission.clone()))
    }

    async fn request_decrypt_all_with_permission(
        &self,
        token_id: U256,
        permission: Permission,
    ) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::RequestDecryptWithPermission(token_id));
        if let Some(reason) = &state.revert_requests {
            bail!("{reason}");
        }
        state.check_permission(token_id, &DecryptAccess::Permission(permission))?;
        let token = state.token_mut(token_id)?;
        token.decrypt_requested = true;
        token.rarity_reads = 0;
        token.attribute_reads = 0;
        Ok(state.next_tx())
    }

    async fn request_decrypt_all(&self, token_id: U256) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(NftCall::RequestDecrypt(token_id));
        if let Some(reason) = &state.revert_requests {
            bail!("{reason}");
        }
        let sender = state.account;
        let token = state.token_mut(token_id)?;
        if token.owner != sender {
            bail!("execution reverted: NotOwner");
        }
        token.decrypt_requested = true;
        token.rarity_reads = 0;
        token.attribute_reads = 0;
        Ok(state.next_tx())
    }
}
