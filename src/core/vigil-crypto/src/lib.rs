//! # Vigil Crypto
//!
//! Core cryptographic primitives for Vigil.
//!
//! This crate provides:
//! - Authenticated symmetric encryption (AES-128/256-GCM)
//! - Digital signatures (RSA-PSS with SHA-2)
//! - Secure random generation behind an injectable capability
//!
//! Every generating operation takes its randomness source as an argument.
//! Pass [`random::OsRng`] in production.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod error;
pub mod keys;
pub mod random;
pub mod signature;

pub use aead::CipherConfig;
pub use error::CryptoError;
pub use keys::{Nonce, SymmetricKey};
pub use random::SecureRandom;
pub use signature::{HashAlgorithm, PssParams, Signature, SignatureConfig, SigningKeyPair};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
