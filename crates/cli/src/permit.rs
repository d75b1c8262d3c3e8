// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::session::Session;
use anyhow::Result;
use fixn_cofhe::{PermissionIssuer, Wallet};
use fixn_config::AppConfig;

pub async fn execute(config: &AppConfig, typed_data: bool) -> Result<()> {
    let session = Session::connect(config).await?;
    let account = session.account()?;
    let issuer = PermissionIssuer::default();

    if typed_data {
        let chain_id = session.wallet.chain_id().await?;
        let request = issuer.prepare(account, session.contract, chain_id)?;
        println!("{}", serde_json::to_string_pretty(&request.typed_data())?);
        return Ok(());
    }

    session.initialize().await?;
    let permission = session
        .context
        .get_or_create_permit(&issuer, account, session.contract, None, None)
        .await?;
    println!("{}", serde_json::to_string_pretty(&permission)?);
    Ok(())
}
