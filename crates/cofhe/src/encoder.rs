// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    client::Coprocessor,
    types::{Encryptable, EncryptedValue, FheType},
    CofheError,
};
use tracing::{debug, warn};

/// Floor then clamp into the `u32` range. NaN becomes zero.
pub fn clamp_u32(value: f64) -> u32 {
    let floored = value.floor();
    if floored.is_nan() || floored <= 0.0 {
        0
    } else if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}

fn clamp_logged(name: &str, value: f64) -> u32 {
    let clamped = clamp_u32(value);
    if clamped as f64 != value {
        warn!(trait_name = name, input = value, clamped, "trait value adjusted to uint32");
    }
    clamped
}

/// The two encrypted traits of a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedTraits {
    pub rarity: EncryptedValue,
    pub attribute: EncryptedValue,
}

/// Encrypt rarity and special attribute in one batch.
///
/// Fails without partial results if the coprocessor errors, returns fewer than
/// two values, or hands back an empty handle.
pub async fn encode_attributes(
    coprocessor: &dyn Coprocessor,
    rarity: f64,
    attribute: f64,
) -> Result<EncryptedTraits, CofheError> {
    let items = [
        Encryptable::Uint32(clamp_logged("rarity", rarity)),
        Encryptable::Uint32(clamp_logged("attribute", attribute)),
    ];

    let values = coprocessor
        .encrypt(&items)
        .await
        .map_err(|e| CofheError::Encryption(e.message))?;

    let mut values = values.into_iter();
    let (Some(rarity), Some(attribute)) = (values.next(), values.next()) else {
        return Err(CofheError::Encryption(
            "coprocessor returned fewer than two ciphertexts".to_string(),
        ));
    };

    for (name, value) in [("rarity", &rarity), ("attribute", &attribute)] {
        if value.is_empty() {
            return Err(CofheError::Encryption(format!(
                "coprocessor returned an empty handle for {name}"
            )));
        }
        if value.utype != FheType::Uint32.tag() {
            return Err(CofheError::Encryption(format!(
                "coprocessor returned type {} for {name}, expected uint32",
                value.utype
            )));
        }
    }

    debug!("traits encrypted");
    Ok(EncryptedTraits { rarity, attribute })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{CoprocessorFailure, WalletBinding};
    use alloy_primitives::{Bytes, U256};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn clamps_into_uint32() {
        assert_eq!(clamp_u32(-5.0), 0);
        assert_eq!(clamp_u32(5e9), 4_294_967_295);
        assert_eq!(clamp_u32(12.7), 12);
        assert_eq!(clamp_u32(75.0), 75);
        assert_eq!(clamp_u32(4_294_967_295.9), u32::MAX);
        assert_eq!(clamp_u32(-0.5), 0);
        assert_eq!(clamp_u32(f64::NAN), 0);
        assert_eq!(clamp_u32(f64::INFINITY), u32::MAX);
        assert_eq!(clamp_u32(f64::NEG_INFINITY), 0);
    }

    enum Reply {
        Handles(Vec<u64>),
        Fail(&'static str),
    }

    struct Scripted {
        reply: Reply,
        seen: Mutex<Vec<Vec<Encryptable>>>,
    }

    impl Scripted {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                seen: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Coprocessor for Scripted {
        async fn initialize(&self, _: &WalletBinding) -> Result<(), CoprocessorFailure> {
            Ok(())
        }

        async fn encrypt(
            &self,
            items: &[Encryptable],
        ) -> Result<Vec<EncryptedValue>, CoprocessorFailure> {
            self.seen.lock().unwrap().push(items.to_vec());
            match &self.reply {
                Reply::Fail(message) => Err(CoprocessorFailure::new(*message)),
                Reply::Handles(handles) => Ok(handles
                    .iter()
                    .map(|h| EncryptedValue {
                        ct_hash: U256::from(*h),
                        security_zone: 0,
                        utype: 4,
                        signature: Bytes::from_static(&[1, 2, 3]),
                    })
                    .collect()),
            }
        }
    }

    #[tokio::test]
    async fn encrypts_both_traits_in_one_batch() {
        let coprocessor = Scripted::new(Reply::Handles(vec![11, 22]));
        let traits = encode_attributes(&coprocessor, 75.0, 3.0).await.unwrap();

        assert_eq!(traits.rarity.ct_hash, U256::from(11));
        assert_eq!(traits.attribute.ct_hash, U256::from(22));
        let seen = coprocessor.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![vec![Encryptable::Uint32(75), Encryptable::Uint32(3)]]
        );
    }

    #[tokio::test]
    async fn out_of_range_values_are_clamped_before_encryption() {
        let coprocessor = Scripted::new(Reply::Handles(vec![1, 2]));
        encode_attributes(&coprocessor, -5.0, 5e9).await.unwrap();
        let seen = coprocessor.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            vec![Encryptable::Uint32(0), Encryptable::Uint32(u32::MAX)]
        );
    }

    #[tokio::test]
    async fn coprocessor_failure_is_an_encryption_error() {
        let coprocessor = Scripted::new(Reply::Fail("gateway down"));
        let err = encode_attributes(&coprocessor, 1.0, 1.0).await.unwrap_err();
        assert_eq!(err, CofheError::Encryption("gateway down".to_string()));
    }

    #[tokio::test]
    async fn empty_or_missing_handles_are_rejected() {
        let coprocessor = Scripted::new(Reply::Handles(vec![5, 0]));
        let err = encode_attributes(&coprocessor, 1.0, 1.0).await.unwrap_err();
        assert!(matches!(err, CofheError::Encryption(ref m) if m.contains("attribute")));

        let coprocessor = Scripted::new(Reply::Handles(vec![5]));
        let err = encode_attributes(&coprocessor, 1.0, 1.0).await.unwrap_err();
        assert!(matches!(err, CofheError::Encryption(ref m) if m.contains("fewer than two")));
    }
}
