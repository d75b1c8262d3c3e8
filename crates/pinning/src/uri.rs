// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub const DEFAULT_GATEWAY: &str = "gateway.pinata.cloud";
const IPFS_SCHEME: &str = "ipfs://";

/// Public HTTP gateway for pinned content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpfsGateway {
    host: String,
}

impl Default for IpfsGateway {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY)
    }
}

impl IpfsGateway {
    /// Accepts a bare host or a full `https://host/` url
    pub fn new(host: &str) -> Self {
        let host = host
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Self {
            host: host.to_string(),
        }
    }

    pub fn url_for(&self, cid: &str) -> String {
        format!("https://{}/ipfs/{}", self.host, cid)
    }

    /// Map `ipfs://<cid>` onto the gateway. Other uris pass through unchanged.
    pub fn normalize(&self, uri: &str) -> String {
        match uri.strip_prefix(IPFS_SCHEME) {
            Some(cid) => self.url_for(cid),
            None => uri.to_string(),
        }
    }
}

pub fn ipfs_uri(cid: &str) -> String {
    format!("{IPFS_SCHEME}{cid}")
}

pub fn normalize_token_uri(uri: &str) -> String {
    IpfsGateway::default().normalize(uri)
}
