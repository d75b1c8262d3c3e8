// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{IpfsGateway, PinningError};
use async_trait::async_trait;
use fixn_config::PinningConfig;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};
use zeroize::Zeroizing;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Content identifier of a pinned object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PinnedObject {
    #[serde(rename = "IpfsHash")]
    pub cid: String,
    #[serde(rename = "PinSize", default)]
    pub size: u64,
}

/// Something that can pin content to IPFS
#[async_trait]
pub trait PinningService: Send + Sync {
    async fn pin_file(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<PinnedObject, PinningError>;

    async fn pin_json(&self, name: &str, content: &Value) -> Result<PinnedObject, PinningError>;

    fn gateway(&self) -> &IpfsGateway;
}

/// Pinata pinning API client authenticated with a JWT
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    jwt: Zeroizing<String>,
    gateway: IpfsGateway,
}

impl PinataClient {
    pub fn new(api_url: &str, jwt: &str, gateway: IpfsGateway) -> Result<Self, PinningError> {
        if jwt.trim().is_empty() {
            return Err(PinningError::MissingJwt);
        }
        let http = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            jwt: Zeroizing::new(jwt.trim().to_string()),
            gateway,
        })
    }

    pub fn from_config(config: &PinningConfig) -> Result<Self, PinningError> {
        let jwt = config.jwt.as_deref().ok_or(PinningError::MissingJwt)?;
        Self::new(&config.api_url, jwt, IpfsGateway::new(&config.gateway))
    }

    async fn read_pin(response: reqwest::Response) -> Result<PinnedObject, PinningError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PinningError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<PinnedObject>().await?)
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<PinnedObject, PinningError> {
        debug!(file_name, mime, size = bytes.len(), "pinning file");
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);
        let response = self
            .http
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .bearer_auth(self.jwt.as_str())
            .multipart(form)
            .send()
            .await?;
        let pinned = Self::read_pin(response).await?;
        info!(cid = %pinned.cid, file_name, "file pinned");
        Ok(pinned)
    }

    async fn pin_json(&self, name: &str, content: &Value) -> Result<PinnedObject, PinningError> {
        let body = json!({
            "pinataContent": content,
            "pinataMetadata": { "name": name },
        });
        let response = self
            .http
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_url))
            .bearer_auth(self.jwt.as_str())
            .json(&body)
            .send()
            .await?;
        let pinned = Self::read_pin(response).await?;
        info!(cid = %pinned.cid, name, "json pinned");
        Ok(pinned)
    }

    fn gateway(&self) -> &IpfsGateway {
        &self.gateway
    }
}
