// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::session::Session;
use anyhow::Result;
use fixn_config::AppConfig;
use serde_json::json;

pub async fn execute(config: &AppConfig, rarity: f64, attribute: f64) -> Result<()> {
    let session = Session::connect(config).await?;
    session.initialize().await?;
    let traits = session.context.encrypt_traits(rarity, attribute).await?;
    let output = json!({
        "rarity": traits.rarity,
        "attribute": traits.attribute,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
