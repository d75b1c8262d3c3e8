// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

#[cfg(feature = "cofhe")]
pub use fixn_cofhe as cofhe;

#[cfg(feature = "evm")]
pub use fixn_config as config;

#[cfg(feature = "evm")]
pub use fixn_evm_helpers as evm_helpers;

#[cfg(feature = "decrypt")]
pub use fixn_decrypt as decrypt;

#[cfg(feature = "collection")]
pub use fixn_collection as collection;

#[cfg(feature = "collection")]
pub use fixn_pinning as pinning;
