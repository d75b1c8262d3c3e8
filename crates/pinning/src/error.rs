// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinningError {
    #[error("Pinata JWT not found. Set pinning.jwt or FIXN_PINNING__JWT")]
    MissingJwt,

    #[error("Pinata upload failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pinata upload failed: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Could not read image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode metadata: {0}")]
    Encode(#[from] serde_json::Error),
}
