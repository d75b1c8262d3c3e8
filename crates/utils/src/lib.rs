// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod clock;
pub mod formatters;
pub mod liveness;
pub mod rng;
pub mod sleep;
pub use clock::*;
pub use formatters::*;
pub use liveness::*;
pub use rng::*;
pub use sleep::*;
