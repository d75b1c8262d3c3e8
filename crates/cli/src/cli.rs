// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{decrypt, encrypt, gallery, mint, permit};
use anyhow::Result;
use clap::{command, ArgAction, Parser, Subcommand};
use fixn_config::validation::ValidAddress;
use fixn_config::{load_config, AppConfig};
use std::path::PathBuf;
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "fixn")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")"))]
#[command(about = "Mint and reveal confidential FIXN OG NFTs backed by the CoFHE coprocessor", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `fixn -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        setup_tracing(self.log_level());
        let config = self.load_config()?;
        info!("Config loaded from: {:?}", config.config_file());

        match self.command {
            Commands::Mint {
                name,
                image,
                rarity,
                attribute,
                description,
            } => mint::execute(&config, name, description, image, rarity, attribute).await?,
            Commands::Decrypt { token_id, retries } => {
                decrypt::execute(&config, token_id, retries).await?
            }
            Commands::Gallery { owned, owner, json } => {
                gallery::execute(&config, owned, owner.map(Into::into), json).await?
            }
            Commands::Permit { typed_data } => permit::execute(&config, typed_data).await?,
            Commands::Encrypt {
                rarity,
                attribute,
            } => encrypt::execute(&config, rarity, attribute).await?,
        }

        Ok(())
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        load_config(self.config.clone())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pin an image and its metadata, encrypt the traits and mint
    Mint {
        /// Token name
        #[arg(long)]
        name: String,

        /// Path to the image file (max 5MB)
        #[arg(long)]
        image: PathBuf,

        /// Rarity score. Clamped into the u32 range.
        #[arg(long, default_value_t = 50.0, allow_negative_numbers = true)]
        rarity: f64,

        /// Special attribute value. Clamped into the u32 range.
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        attribute: f64,

        /// Defaults to "<name> - A privacy-preserving NFT from FIXN OG"
        #[arg(long)]
        description: Option<String>,
    },

    /// Reveal the encrypted traits of a token you own
    Decrypt {
        token_id: u64,

        /// Extra sessions to run while the coprocessor is still pending
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },

    /// List every minted token
    Gallery {
        /// Only tokens owned by the configured wallet
        #[arg(long, conflicts_with = "owner")]
        owned: bool,

        /// Only tokens owned by this address
        #[arg(long)]
        owner: Option<ValidAddress>,

        /// Print as json
        #[arg(long)]
        json: bool,
    },

    /// Sign a self-issued decryption permission for the configured wallet
    Permit {
        /// Print the EIP-712 payload instead of the signed permission
        #[arg(long)]
        typed_data: bool,
    },

    /// Encrypt a rarity and attribute pair without minting
    Encrypt {
        #[arg(allow_negative_numbers = true)]
        rarity: f64,
        #[arg(allow_negative_numbers = true)]
        attribute: f64,
    },
}
