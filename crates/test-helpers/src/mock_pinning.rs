// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use async_trait::async_trait;
use fixn_pinning::{IpfsGateway, PinnedObject, PinningError, PinningService};
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Pinned {
    File {
        file_name: String,
        mime: String,
        size: usize,
    },
    Json {
        name: String,
        content: Value,
    },
}

#[derive(Default)]
struct State {
    pinned: Vec<Pinned>,
    reject_with: Option<(u16, String)>,
}

/// Pins into memory and hands out sequential content ids
#[derive(Clone, Default)]
pub struct MockPinning {
    state: Arc<Mutex<State>>,
    gateway: IpfsGateway,
}

impl MockPinning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every upload with this HTTP status
    pub fn reject(&self, status: u16, body: &str) {
        self.state.lock().unwrap().reject_with = Some((status, body.to_string()));
    }

    pub fn pinned(&self) -> Vec<Pinned> {
        self.state.lock().unwrap().pinned.clone()
    }

    fn pin(&self, item: Pinned) -> Result<PinnedObject, PinningError> {
        let mut state = self.state.lock().unwrap();
        if let Some((status, body)) = &state.reject_with {
            return Err(PinningError::Api {
                status: *status,
                body: body.clone(),
            });
        }
        state.pinned.push(item);
        Ok(PinnedObject {
            cid: format!("QmMock{}", state.pinned.len()),
            size: 0,
        })
    }
}

#[async_trait]
impl PinningService for MockPinning {
    async fn pin_file(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<PinnedObject, PinningError> {
        self.pin(Pinned::File {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            size: bytes.len(),
        })
    }

    async fn pin_json(&self, name: &str, content: &Value) -> Result<PinnedObject, PinningError> {
        self.pin(Pinned::Json {
            name: name.to_string(),
            content: content.clone(),
        })
    }

    fn gateway(&self) -> &IpfsGateway {
        &self.gateway
    }
}
