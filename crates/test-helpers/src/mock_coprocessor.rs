// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{Bytes, U256};
use async_trait::async_trait;
use fixn_cofhe::{Coprocessor, CoprocessorFailure, Encryptable, EncryptedValue, WalletBinding};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

#[derive(Default)]
struct State {
    bindings: Vec<WalletBinding>,
    batches: Vec<Vec<Encryptable>>,
    plaintexts: HashMap<U256, u64>,
    next_handle: u64,
    fail_initialize: Option<String>,
    fail_encrypt: Option<String>,
    empty_handles: bool,
}

/// In-memory coprocessor. Handles are sequential and remember their plaintext
/// so a mock contract can "decrypt" them later.
#[derive(Clone, Default)]
pub struct MockCoprocessor {
    state: Arc<Mutex<State>>,
}

impl MockCoprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_initialize(&self, message: &str) {
        self.state.lock().unwrap().fail_initialize = Some(message.to_string());
    }

    pub fn fail_encrypt(&self, message: &str) {
        self.state.lock().unwrap().fail_encrypt = Some(message.to_string());
    }

    /// Report success but hand back zero handles
    pub fn return_empty_handles(&self) {
        self.state.lock().unwrap().empty_handles = true;
    }

    pub fn bindings(&self) -> Vec<WalletBinding> {
        self.state.lock().unwrap().bindings.clone()
    }

    pub fn batches(&self) -> Vec<Vec<Encryptable>> {
        self.state.lock().unwrap().batches.clone()
    }

    pub fn plaintext_of(&self, ct_hash: U256) -> Option<u64> {
        self.state.lock().unwrap().plaintexts.get(&ct_hash).copied()
    }
}

#[async_trait]
impl Coprocessor for MockCoprocessor {
    async fn initialize(&self, binding: &WalletBinding) -> Result<(), CoprocessorFailure> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.fail_initialize {
            return Err(CoprocessorFailure::new(message.clone()));
        }
        state.bindings.push(binding.clone());
        Ok(())
    }

    async fn encrypt(
        &self,
        items: &[Encryptable],
    ) -> Result<Vec<EncryptedValue>, CoprocessorFailure> {
        let mut state = self.state.lock().unwrap();
        state.batches.push(items.to_vec());
        if let Some(message) = &state.fail_encrypt {
            return Err(CoprocessorFailure::new(message.clone()));
        }

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            state.next_handle += 1;
            let ct_hash = if state.empty_handles {
                U256::ZERO
            } else {
                U256::from(0x1000 + state.next_handle)
            };
            let plaintext = item.plaintext().parse::<u64>().unwrap_or_default();
            state.plaintexts.insert(ct_hash, plaintext);
            values.push(EncryptedValue {
                ct_hash,
                security_zone: 0,
                utype: item.fhe_type().tag(),
                signature: Bytes::from(vec![0xab; 65]),
            });
        }
        Ok(values)
    }
}
