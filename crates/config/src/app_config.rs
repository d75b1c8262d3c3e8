// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::chain_config::ChainConfig;
use crate::load_config::{find_in_parent, resolve_config_path, DEFAULT_CONFIG_NAME};
use crate::yaml::load_yaml_with_env;
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{env, fmt, path::PathBuf, time::Duration};
use tracing::debug;
use zeroize::Zeroizing;

/// Which CoFHE deployment the coprocessor client talks to
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CofheEnvironment {
    Mainnet,
    #[default]
    Testnet,
    Local,
}

impl fmt::Display for CofheEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CofheEnvironment::Mainnet => "MAINNET",
            CofheEnvironment::Testnet => "TESTNET",
            CofheEnvironment::Local => "LOCAL",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    /// Hex encoded private key. Usually supplied as `${FIXN_PRIVATE_KEY}`.
    pub private_key: Option<String>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CofheConfig {
    pub environment: CofheEnvironment,
    /// Url of the local encryption sidecar. Required by commands that encrypt or decrypt.
    pub url: Option<String>,
}

#[derive(Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PinningConfig {
    /// Pinata JWT
    pub jwt: Option<String>,
    /// Gateway host used to build public urls eg. `gateway.pinata.cloud`
    pub gateway: String,
    /// Pinning API base url
    pub api_url: String,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            jwt: None,
            gateway: "gateway.pinata.cloud".to_string(),
            api_url: "https://api.pinata.cloud".to_string(),
        }
    }
}

impl fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinningConfig")
            .field("jwt", &self.jwt.as_ref().map(|_| "<redacted>"))
            .field("gateway", &self.gateway)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Polling budget for decryption results
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DecryptConfig {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for DecryptConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval_ms: 1500,
        }
    }
}

impl DecryptConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MintConfig {
    /// Mint price in ether as a decimal string
    pub price: String,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            price: "0.001".to_string(),
        }
    }
}

/// The config actually used throughout the app
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    chain: ChainConfig,
    #[serde(default)]
    wallet: WalletConfig,
    #[serde(default)]
    cofhe: CofheConfig,
    #[serde(default)]
    pinning: PinningConfig,
    #[serde(default)]
    decrypt: DecryptConfig,
    #[serde(default)]
    mint: MintConfig,
    #[serde(default)]
    config_file: PathBuf,
}

impl AppConfig {
    /// Check the parts of the config that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.chain.rpc_url()?;
        self.chain.contracts.nft.parsed_address()?;
        if self.decrypt.max_attempts == 0 {
            bail!("decrypt.max_attempts must be at least 1");
        }
        if let Some(url) = &self.cofhe.url {
            url::Url::parse(url).with_context(|| format!("Invalid cofhe.url '{}'", url))?;
        }
        url::Url::parse(&self.pinning.api_url)
            .with_context(|| format!("Invalid pinning.api_url '{}'", self.pinning.api_url))?;
        Ok(())
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// The configured private key if any
    pub fn private_key(&self) -> Option<Zeroizing<String>> {
        self.wallet
            .private_key
            .as_ref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Zeroizing::new(key.trim().to_string()))
    }

    pub fn cofhe(&self) -> &CofheConfig {
        &self.cofhe
    }

    pub fn pinning(&self) -> &PinningConfig {
        &self.pinning
    }

    pub fn decrypt(&self) -> &DecryptConfig {
        &self.decrypt
    }

    pub fn mint(&self) -> &MintConfig {
        &self.mint
    }

    /// Get the config file path
    pub fn config_file(&self) -> &PathBuf {
        &self.config_file
    }
}

/// Value struct for passing configuration from the cli to the configuration
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
struct CliOverrides {
    config_file: PathBuf,
}

/// Load the config at the config_file or the default location if not provided.
///
/// Values are layered: yaml file, then `FIXN_` prefixed environment variables
/// (`FIXN_DECRYPT__MAX_ATTEMPTS=40`).
pub fn load_config(config_file: Option<String>) -> Result<AppConfig> {
    let config_file = config_file.map(PathBuf::from);

    let resolved_config_path = resolve_config_path(
        find_in_parent,
        &env::current_dir()?,
        &OsDirs::config_dir(),
        DEFAULT_CONFIG_NAME,
        config_file.as_deref(),
    );
    debug!(path = ?resolved_config_path, "Loading configuration");

    let loaded_yaml =
        load_yaml_with_env(&resolved_config_path).context("Configuration file not found")?;

    let config = from_yaml_str(&loaded_yaml, resolved_config_path)?;
    Ok(config)
}

fn from_yaml_str(yaml: &str, config_file: PathBuf) -> Result<AppConfig> {
    let config: AppConfig = Figment::new()
        .merge(Yaml::string(yaml))
        .merge(Env::prefixed("FIXN_").split("__").ignore(&["private_key"]))
        .merge(Serialized::defaults(&CliOverrides { config_file }))
        .extract()
        .context("Could not parse configuration")?;

    config.validate()?;
    Ok(config)
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fixn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const CONFIG: &str = r#"
chain:
  name: "sepolia"
  rpc_url: "https://rpc.sepolia.org"
  chain_id: 11155111
  explorer_url: "https://sepolia.etherscan.io"
  contracts:
    nft:
      address: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
wallet:
  private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
pinning:
  jwt: "jwt-token"
"#;

    #[test]
    fn test_deserialization() -> Result<()> {
        let config = from_yaml_str(CONFIG, PathBuf::from("/work/fixn.config.yaml"))?;

        assert_eq!(config.chain().name, "sepolia");
        assert!(config.chain().is_sepolia());
        assert_eq!(
            config.chain().contracts.nft.address(),
            "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
        );
        assert_eq!(config.cofhe().environment, CofheEnvironment::Testnet);
        assert_eq!(config.pinning().gateway, "gateway.pinata.cloud");
        assert_eq!(config.pinning().jwt.as_deref(), Some("jwt-token"));
        assert_eq!(config.decrypt(), &DecryptConfig::default());
        assert_eq!(config.decrypt().interval(), Duration::from_millis(1500));
        assert_eq!(config.mint().price, "0.001");
        assert!(config.private_key().is_some());
        assert_eq!(config.config_file(), &PathBuf::from("/work/fixn.config.yaml"));
        Ok(())
    }

    #[test]
    fn test_secrets_are_redacted() -> Result<()> {
        let config = from_yaml_str(CONFIG, PathBuf::new())?;
        let debug = format!("{:?}", config);
        assert!(!debug.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478"));
        assert!(!debug.contains("jwt-token"));
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("FIXN_DECRYPT__MAX_ATTEMPTS", "40");
            jail.set_env("FIXN_COFHE__ENVIRONMENT", "local");

            let config =
                from_yaml_str(CONFIG, PathBuf::new()).map_err(|err| err.to_string())?;

            assert_eq!(config.decrypt().max_attempts, 40);
            assert_eq!(config.decrypt().interval_ms, 1500);
            assert_eq!(config.cofhe().environment, CofheEnvironment::Local);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_rpc = CONFIG.replace("https://rpc.sepolia.org", "ftp://rpc.sepolia.org");
        assert!(from_yaml_str(&bad_rpc, PathBuf::new()).is_err());

        let bad_address = CONFIG.replace("0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0", "0x12");
        assert!(from_yaml_str(&bad_address, PathBuf::new()).is_err());

        let zero_attempts = format!("{CONFIG}decrypt:\n  max_attempts: 0\n");
        assert!(from_yaml_str(&zero_attempts, PathBuf::new()).is_err());
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config(Some("/nope/fixn.config.yaml".to_string())) else {
            bail!("error expected");
        };
        let Some(e) = err.downcast_ref::<std::io::Error>() else {
            bail!("io error expected");
        };

        assert_eq!(e.kind(), std::io::ErrorKind::NotFound);

        Ok(())
    }

    #[test]
    fn test_load_from_cwd() {
        Jail::expect_with(|jail| {
            jail.set_env("FIXN_TEST_PINATA_JWT", "from-env");
            jail.create_file(
                DEFAULT_CONFIG_NAME,
                r#"
chain:
  name: "local"
  rpc_url: "ws://localhost:8545"
  contracts:
    nft: "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"
pinning:
  jwt: "${FIXN_TEST_PINATA_JWT}"
"#,
            )?;

            let config = load_config(None).map_err(|err| err.to_string())?;
            assert_eq!(config.chain().name, "local");
            assert_eq!(config.chain().chain_id, None);
            assert_eq!(config.pinning().jwt.as_deref(), Some("from-env"));
            assert!(config.private_key().is_none());
            assert!(config.config_file().ends_with(DEFAULT_CONFIG_NAME));
            Ok(())
        });
    }
}
