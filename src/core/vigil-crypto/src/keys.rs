//! Symmetric key and nonce types.
//!
//! `SymmetricKey` implements `Zeroize` and `ZeroizeOnDrop` so key material
//! is erased from memory when dropped. It has no serializer and its `Debug`
//! output is redacted, which keeps it out of logs and responses.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::aead::{KEY_SIZE_128, KEY_SIZE_256, NONCE_SIZE};
use crate::error::CryptoError;
use crate::random::{self, SecureRandom};

/// An AES-GCM key of 128 or 256 bits with automatic zeroization.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    /// Generates a new random key of `bit_length` bits.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] unless `bit_length` is 128 or 256,
    /// and [`CryptoError::RandomSourceFailed`] if `rng` cannot produce bytes.
    pub fn generate<R: SecureRandom>(rng: &mut R, bit_length: usize) -> Result<Self, CryptoError> {
        let len = key_len_for_bits(bit_length)?;
        let bytes = random::generate_bytes(rng, len)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Creates a symmetric key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 16 or 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_SIZE_128 && bytes.len() != KEY_SIZE_256 {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} or {} bytes, got {}",
                KEY_SIZE_128,
                KEY_SIZE_256,
                bytes.len()
            )));
        }

        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Returns the key length in bits.
    #[inline]
    pub fn bit_length(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Returns the raw key bytes.
    ///
    /// Use with caution - the returned slice is not zeroized automatically.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bits", &self.bit_length())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

fn key_len_for_bits(bit_length: usize) -> Result<usize, CryptoError> {
    match bit_length {
        128 => Ok(KEY_SIZE_128),
        256 => Ok(KEY_SIZE_256),
        other => Err(CryptoError::InvalidKey(format!(
            "unsupported key length {} bits (expected 128 or 256)",
            other
        ))),
    }
}

/// A 96-bit AES-GCM nonce.
///
/// Nonces are not secret. A (key, nonce) pair must never encrypt two
/// distinct plaintexts; nothing in this type tracks that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    /// Wraps an exact-length byte array.
    pub const fn from_array(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a nonce from a slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 12 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; NONCE_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidInput(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Returns the nonce bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}
