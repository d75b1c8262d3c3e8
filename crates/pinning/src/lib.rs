// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod error;
mod metadata;
mod pinata;
mod uri;

pub use error::*;
pub use metadata::*;
pub use pinata::*;
pub use uri::*;
