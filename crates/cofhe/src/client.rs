// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::types::{Encryptable, EncryptedValue};
use alloy_primitives::Address;
use async_trait::async_trait;
use fixn_config::{CofheConfig, CofheEnvironment};
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MISSING_SIDECAR_URL: &str = "cofhe.url is not set; point it at the local encryption sidecar";

/// Failure reported by the coprocessor, or by the transport in front of it
#[derive(Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[error("{message}")]
pub struct CoprocessorFailure {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl CoprocessorFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// The account and network the coprocessor session is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBinding {
    pub account: Address,
    pub chain_id: u64,
    pub environment: String,
    /// Permits are issued by this client, never by the coprocessor session
    pub generate_permit: bool,
}

impl WalletBinding {
    pub fn new(account: Address, chain_id: u64, environment: CofheEnvironment) -> Self {
        Self {
            account,
            chain_id,
            environment: environment.to_string(),
            generate_permit: false,
        }
    }
}

/// The opaque FHE capability
#[async_trait]
pub trait Coprocessor: Send + Sync {
    /// Bind the session to a wallet. Must succeed before `encrypt`.
    async fn initialize(&self, binding: &WalletBinding) -> Result<(), CoprocessorFailure>;

    /// Encrypt a batch. The result is positionally aligned with `items`.
    async fn encrypt(&self, items: &[Encryptable])
        -> Result<Vec<EncryptedValue>, CoprocessorFailure>;
}

/// `{ success, data | error }` as returned by the sidecar
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<CoprocessorFailure>,
}

impl<T> Envelope<T> {
    fn into_result(self, operation: &str) -> Result<T, CoprocessorFailure> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(error),
            (true, None, None) => Err(CoprocessorFailure::new(format!(
                "{operation} returned no data"
            ))),
            (false, _, None) => Err(CoprocessorFailure::new(format!("{operation} failed"))),
        }
    }

    /// For calls whose only payload is the success flag
    fn into_ack(self, operation: &str) -> Result<(), CoprocessorFailure> {
        match (self.success, self.error) {
            (true, _) => Ok(()),
            (false, Some(error)) => Err(error),
            (false, None) => Err(CoprocessorFailure::new(format!("{operation} failed"))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptItem {
    utype: u8,
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptRequest<'a> {
    account: Address,
    chain_id: u64,
    security_zone: u8,
    items: &'a [EncryptItem],
}

/// Client for the CoFHE encryption sidecar running on this host.
///
/// The sidecar holds the network key material and encrypts in-process, so plaintext traits
/// only ever travel over the loopback interface. Remote hosts are refused.
pub struct HttpCoprocessor {
    http: reqwest::Client,
    base_url: String,
    binding: RwLock<Option<WalletBinding>>,
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

impl HttpCoprocessor {
    pub fn new(base_url: &str) -> Result<Self, CoprocessorFailure> {
        let url = Url::parse(base_url).map_err(|e| {
            CoprocessorFailure::new(format!("invalid sidecar url '{base_url}': {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoprocessorFailure::new(format!(
                "sidecar url '{base_url}' must use http or https"
            )));
        }
        if !is_loopback(&url) {
            return Err(CoprocessorFailure::new(format!(
                "sidecar url '{base_url}' is not a loopback address"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoprocessorFailure::new(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            binding: RwLock::new(None),
        })
    }

    /// `cofhe.url` has no default and must name the local sidecar
    pub fn from_config(config: &CofheConfig) -> Result<Self, CoprocessorFailure> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| CoprocessorFailure::new(MISSING_SIDECAR_URL))?;
        Self::new(url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn current_binding(&self) -> Option<WalletBinding> {
        self.binding.read().ok().and_then(|binding| (*binding).clone())
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>, CoprocessorFailure> {
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, "coprocessor request");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| CoprocessorFailure::new(format!("{path}: {e}")))?;

        let status = response.status();
        response.json::<Envelope<T>>().await.map_err(|e| {
            CoprocessorFailure::new(format!("{path}: HTTP {status}, unreadable response: {e}"))
        })
    }
}

#[async_trait]
impl Coprocessor for HttpCoprocessor {
    async fn initialize(&self, binding: &WalletBinding) -> Result<(), CoprocessorFailure> {
        self.post::<_, serde_json::Value>("/v1/session", binding)
            .await?
            .into_ack("/v1/session")?;
        debug!(
            account = %binding.account,
            chain_id = binding.chain_id,
            "coprocessor session bound"
        );
        if let Ok(mut current) = self.binding.write() {
            *current = Some(binding.clone());
        }
        Ok(())
    }

    async fn encrypt(
        &self,
        items: &[Encryptable],
    ) -> Result<Vec<EncryptedValue>, CoprocessorFailure> {
        let binding = self
            .current_binding()
            .ok_or_else(|| CoprocessorFailure::new("coprocessor session is not initialized"))?;
        let items: Vec<EncryptItem> = items
            .iter()
            .map(|item| EncryptItem {
                utype: item.fhe_type().tag(),
                value: item.plaintext(),
            })
            .collect();
        let request = EncryptRequest {
            account: binding.account,
            chain_id: binding.chain_id,
            security_zone: 0,
            items: &items,
        };
        self.post("/v1/encrypt", &request)
            .await?
            .into_result("/v1/encrypt")
    }
}
