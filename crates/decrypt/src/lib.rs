// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Reveals the encrypted traits of a token to its owner.
//!
//! A decrypt session signs a permission, negotiates which contract entry
//! point to use, submits one decrypt request and polls until both traits are
//! readable. [`DecryptCard`] keeps the per token state between sessions.

mod card;
mod error;
mod mode;
mod orchestrator;
mod policy;
mod status;

pub use card::*;
pub use error::*;
pub use mode::*;
pub use orchestrator::*;
pub use policy::*;
pub use status::*;
