// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use fixn_evm_helpers::contracts::{DecryptAccess, Permission};
use std::fmt;

/// Which decrypt entry points a deployment supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecryptMode {
    /// `requestDecryptAllWithPermission` and the `*WithPermission` getters
    Permissioned,
    /// `requestDecryptAll` and the plain getters, authorised by ownership
    OwnerOnly,
}

impl DecryptMode {
    /// Negotiation only ever moves towards `OwnerOnly`
    pub fn merge(current: Option<DecryptMode>, probed: DecryptMode) -> DecryptMode {
        match current {
            Some(DecryptMode::OwnerOnly) => DecryptMode::OwnerOnly,
            _ => probed,
        }
    }

    pub fn access(self, permission: &Permission) -> DecryptAccess {
        match self {
            DecryptMode::Permissioned => DecryptAccess::Permission(permission.clone()),
            DecryptMode::OwnerOnly => DecryptAccess::Owner,
        }
    }
}

impl fmt::Display for DecryptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecryptMode::Permissioned => write!(f, "permissioned"),
            DecryptMode::OwnerOnly => write!(f, "owner-only"),
        }
    }
}
