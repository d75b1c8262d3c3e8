// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fixn_config::AppConfig;

pub mod telemetry;

/// Explorer link when the chain has one, otherwise the bare hash
pub fn tx_display(config: &AppConfig, tx_hash: &str) -> String {
    config
        .chain()
        .tx_link(tx_hash)
        .unwrap_or_else(|| tx_hash.to_string())
}
