// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod mock_coprocessor;
mod mock_nft;
mod mock_pinning;
mod sleeper;
mod utils;
mod wallet;

pub use mock_coprocessor::*;
pub use mock_nft::*;
pub use mock_pinning::*;
pub use sleeper::*;
pub use utils::*;
pub use wallet::*;
