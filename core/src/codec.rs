//! Codecs turning the raw payloads of proofs into typed values.

use alloc::{string::String, vec::Vec};

use crate::error::{DecodeError, EncodeError};

/// A value (de)serializer used to interpret list elements and map values.
///
/// Decoding must fail on malformed bytes instead of producing a default value.
pub trait ValueCodec {
    /// The typed value.
    type Value;

    /// Decode a value from its raw bytes.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Value, DecodeError>;

    /// Encode a value into its raw bytes.
    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, EncodeError>;
}

/// Keeps values as raw bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawCodec;

impl ValueCodec for RawCodec {
    type Value = Vec<u8>;

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
        Ok(bytes.to_vec())
    }

    fn encode(&self, value: &Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        Ok(value.clone())
    }
}

/// UTF-8 strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Utf8Codec;

impl ValueCodec for Utf8Codec {
    type Value = String;

    fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        core::str::from_utf8(bytes)
            .map(String::from)
            .map_err(|_| DecodeError::Utf8)
    }

    fn encode(&self, value: &String) -> Result<Vec<u8>, EncodeError> {
        Ok(value.as_bytes().to_vec())
    }
}

/// Unsigned 64-bit integers in little-endian byte order.
#[derive(Debug, Default, Clone, Copy)]
pub struct U64Codec;

impl ValueCodec for U64Codec {
    type Value = u64;

    fn decode(&self, bytes: &[u8]) -> Result<u64, DecodeError> {
        let bytes: [u8; 8] = bytes.try_into().map_err(|_| DecodeError::Length {
            expected: 8,
            actual: bytes.len(),
        })?;
        Ok(u64::from_le_bytes(bytes))
    }

    fn encode(&self, value: &u64) -> Result<Vec<u8>, EncodeError> {
        Ok(value.to_le_bytes().to_vec())
    }
}

#[cfg(feature = "borsh")]
pub use self::borsh_codec::BorshCodec;

#[cfg(feature = "borsh")]
mod borsh_codec {
    use alloc::{string::ToString, vec::Vec};
    use core::marker::PhantomData;

    use borsh::{BorshDeserialize, BorshSerialize};

    use super::ValueCodec;
    use crate::error::{DecodeError, EncodeError};

    /// Values in the borsh binary format.
    pub struct BorshCodec<T>(PhantomData<T>);

    impl<T> BorshCodec<T> {
        /// Create a new codec.
        pub fn new() -> Self {
            BorshCodec(PhantomData)
        }
    }

    impl<T> Default for BorshCodec<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T: BorshSerialize + BorshDeserialize> ValueCodec for BorshCodec<T> {
        type Value = T;

        fn decode(&self, bytes: &[u8]) -> Result<T, DecodeError> {
            T::try_from_slice(bytes).map_err(|e| DecodeError::Custom(e.to_string()))
        }

        fn encode(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
            borsh::to_vec(value).map_err(|e| EncodeError(e.to_string()))
        }
    }

}
