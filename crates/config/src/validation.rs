// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::str::FromStr;

use alloy_primitives::Address;
use anyhow::Context;

/// Ethereum address argument validated at parse time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidAddress(Address);

impl FromStr for ValidAddress {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = s
            .parse::<Address>()
            .with_context(|| format!("'{}' is not a valid address", s))?;
        Ok(ValidAddress(address))
    }
}

impl From<ValidAddress> for Address {
    fn from(value: ValidAddress) -> Self {
        value.0
    }
}
