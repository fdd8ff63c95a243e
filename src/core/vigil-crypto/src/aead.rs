//! AES-GCM authenticated encryption.
//!
//! Provides authenticated encryption with associated data (AEAD) using
//! AES-128-GCM or AES-256-GCM, selected by the length of the key.
//!
//! Two call shapes are offered:
//!
//! - [`encrypt`] / [`decrypt`] take the nonce explicitly and return
//!   `ciphertext || tag`. The caller must never reuse a (key, nonce) pair.
//! - [`seal`] / [`open`] draw a fresh nonce per call and prepend it:
//!   `nonce (12 bytes) || ciphertext || tag (16 bytes)`.

use aes_gcm::{
    aead::{Aead, KeyInit, Nonce as AeadNonce, Payload},
    Aes128Gcm, Aes256Gcm,
};
use tracing::warn;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::{Nonce, SymmetricKey};
use crate::random::{generate_nonce, SecureRandom};

/// Size of an AES-128 key in bytes.
pub const KEY_SIZE_128: usize = 16;

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE_256: usize = 32;

/// Size of a GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Parameters of the authenticated cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherConfig {
    /// Key length in bits: 128 or 256.
    pub key_bits: usize,
    /// Nonce length in bytes. GCM is only used with its native 12 bytes.
    pub nonce_len: usize,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            key_bits: 128,
            nonce_len: NONCE_SIZE,
        }
    }
}

impl CipherConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.key_bits != 128 && self.key_bits != 256 {
            return Err(CryptoError::InvalidConfig(format!(
                "key_bits must be 128 or 256, got {}",
                self.key_bits
            )));
        }
        if self.nonce_len != NONCE_SIZE {
            return Err(CryptoError::InvalidConfig(format!(
                "nonce_len must be {}, got {}",
                NONCE_SIZE, self.nonce_len
            )));
        }
        Ok(())
    }

    /// Generates a key of the configured length.
    pub fn generate_key<R: SecureRandom>(&self, rng: &mut R) -> Result<SymmetricKey, CryptoError> {
        self.validate()?;
        SymmetricKey::generate(rng, self.key_bits)
    }
}

/// Encrypts plaintext under `key` and `nonce`.
///
/// # Arguments
///
/// * `key` - 128- or 256-bit key
/// * `nonce` - 12-byte nonce, unique for this key
/// * `plaintext` - Data to encrypt
/// * `associated_data` - Optional additional data to authenticate (not encrypted)
///
/// # Returns
///
/// Ciphertext with the 16-byte authentication tag appended.
pub fn encrypt(
    key: &SymmetricKey,
    nonce: &Nonce,
    plaintext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, CryptoError> {
    let payload = Payload {
        msg: plaintext,
        aad: associated_data.unwrap_or_default(),
    };

    match key.as_bytes().len() {
        KEY_SIZE_128 => encrypt_with::<Aes128Gcm>(key.as_bytes(), nonce, payload),
        KEY_SIZE_256 => encrypt_with::<Aes256Gcm>(key.as_bytes(), nonce, payload),
        other => Err(CryptoError::InvalidKey(format!(
            "unsupported key size {} bytes",
            other
        ))),
    }
}

/// Decrypts `ciphertext || tag` under `key` and `nonce`.
///
/// # Errors
///
/// * [`CryptoError::AuthenticationFailed`] if the tag does not verify. No
///   plaintext, partial or otherwise, is released in that case.
/// * [`CryptoError::InvalidInput`] if the input is shorter than a tag.
///
/// # Returns
///
/// Decrypted plaintext wrapped in `Zeroizing` for automatic memory cleanup.
pub fn decrypt(
    key: &SymmetricKey,
    nonce: &Nonce,
    ciphertext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::InvalidInput(
            "ciphertext too short".to_string(),
        ));
    }

    let payload = Payload {
        msg: ciphertext,
        aad: associated_data.unwrap_or_default(),
    };

    let plaintext = match key.as_bytes().len() {
        KEY_SIZE_128 => decrypt_with::<Aes128Gcm>(key.as_bytes(), nonce, payload)?,
        KEY_SIZE_256 => decrypt_with::<Aes256Gcm>(key.as_bytes(), nonce, payload)?,
        other => {
            return Err(CryptoError::InvalidKey(format!(
                "unsupported key size {} bytes",
                other
            )))
        },
    };

    Ok(Zeroizing::new(plaintext))
}

/// Encrypts with a freshly generated nonce and prepends it to the output.
///
/// Format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
pub fn seal<R: SecureRandom>(
    rng: &mut R,
    key: &SymmetricKey,
    plaintext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, CryptoError> {
    let nonce = generate_nonce(rng)?;
    let ciphertext = encrypt(key, &nonce, plaintext, associated_data)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(nonce.as_bytes());
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Opens an envelope produced by [`seal`].
pub fn open(
    key: &SymmetricKey,
    sealed: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidInput(
            "sealed payload too short".to_string(),
        ));
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
    decrypt(key, &Nonce::from_slice(nonce)?, ciphertext, associated_data)
}

fn encrypt_with<C: Aead + KeyInit>(
    key: &[u8],
    nonce: &Nonce,
    payload: Payload<'_, '_>,
) -> Result<Vec<u8>, CryptoError> {
    let cipher = C::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    cipher
        .encrypt(AeadNonce::<C>::from_slice(nonce.as_bytes()), payload)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

fn decrypt_with<C: Aead + KeyInit>(
    key: &[u8],
    nonce: &Nonce,
    payload: Payload<'_, '_>,
) -> Result<Vec<u8>, CryptoError> {
    let cipher = C::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    cipher
        .decrypt(AeadNonce::<C>::from_slice(nonce.as_bytes()), payload)
        .map_err(|_| {
            warn!("AEAD tag verification failed");
            CryptoError::AuthenticationFailed
        })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::random::OsRng;

    fn key128() -> SymmetricKey {
        SymmetricKey::generate(&mut OsRng, 128).unwrap()
    }

    fn nonce() -> Nonce {
        generate_nonce(&mut OsRng).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = key128();
        let nonce = nonce();
        let plaintext = b"Card number 4111-1111-1111-1111";

        let ciphertext = encrypt(&key, &nonce, plaintext, None).unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext, None).unwrap();

        assert_eq!(&*decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip_256() {
        let key = SymmetricKey::generate(&mut OsRng, 256).unwrap();
        let nonce = nonce();
        let plaintext = b"Hello, Vigil!";

        let ciphertext = encrypt(&key, &nonce, plaintext, None).unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext, None).unwrap();

        assert_eq!(&*decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_empty_plaintext() {
        let key = key128();
        let nonce = nonce();

        let ciphertext = encrypt(&key, &nonce, b"", None).unwrap();
        assert_eq!(ciphertext.len(), TAG_SIZE);

        let decrypted = decrypt(&key, &nonce, &ciphertext, None).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_encrypt_decrypt_with_aad() {
        let key = key128();
        let nonce = nonce();
        let plaintext = b"secret data";
        let aad = b"additional authenticated data";

        let ciphertext = encrypt(&key, &nonce, plaintext, Some(aad)).unwrap();
        let decrypted = decrypt(&key, &nonce, &ciphertext, Some(aad)).unwrap();

        assert_eq!(&*decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_wrong_aad_fails() {
        let key = key128();
        let nonce = nonce();

        let ciphertext = encrypt(&key, &nonce, b"secret data", Some(b"correct aad")).unwrap();

        let result = decrypt(&key, &nonce, &ciphertext, Some(b"wrong aad"));
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));

        let result = decrypt(&key, &nonce, &ciphertext, None);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_decrypt_wrong_key_fails() {
        let key1 = key128();
        let key2 = key128();
        let nonce = nonce();

        let ciphertext = encrypt(&key1, &nonce, b"secret data", None).unwrap();
        let result = decrypt(&key2, &nonce, &ciphertext, None);

        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_decrypt_wrong_nonce_fails() {
        let key = key128();

        let ciphertext = encrypt(&key, &nonce(), b"secret data", None).unwrap();
        let result = decrypt(&key, &nonce(), &ciphertext, None);

        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_every_single_bit_flip_fails() {
        let key = key128();
        let nonce = nonce();
        let ciphertext = encrypt(&key, &nonce, b"transfer 100", None).unwrap();

        for byte in 0..ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = ciphertext.clone();
                tampered[byte] ^= 1 << bit;

                let result = decrypt(&key, &nonce, &tampered, None);
                assert!(
                    matches!(result, Err(CryptoError::AuthenticationFailed)),
                    "flip of byte {} bit {} was accepted",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_truncated_ciphertext_is_malformed() {
        let key = key128();
        let result = decrypt(&key, &nonce(), &[0u8; TAG_SIZE - 1], None);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_ciphertext_format() {
        let key = key128();
        let plaintext = b"test";

        let ciphertext = encrypt(&key, &nonce(), plaintext, None).unwrap();

        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);
    }

    // GCM test vectors, test cases 1, 2 and 14.
    #[test]
    fn test_aes128_gcm_known_answer_empty() {
        let key = SymmetricKey::from_bytes(&[0u8; KEY_SIZE_128]).unwrap();
        let nonce = Nonce::from_array([0u8; NONCE_SIZE]);

        let output = encrypt(&key, &nonce, b"", None).unwrap();

        assert_eq!(hex::encode(output), "58e2fccefa7e3061367f1d57a4e7455a");
    }

    #[test]
    fn test_aes128_gcm_known_answer() {
        let key = SymmetricKey::from_bytes(&[0u8; KEY_SIZE_128]).unwrap();
        let nonce = Nonce::from_array([0u8; NONCE_SIZE]);

        let output = encrypt(&key, &nonce, &[0u8; 16], None).unwrap();

        let expected = hex::decode(
            "0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf",
        )
        .unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn test_aes256_gcm_known_answer() {
        let key = SymmetricKey::from_bytes(&[0u8; KEY_SIZE_256]).unwrap();
        let nonce = Nonce::from_array([0u8; NONCE_SIZE]);

        let output = encrypt(&key, &nonce, &[0u8; 16], None).unwrap();

        let expected = hex::decode(
            "cea7403d4d606b6e074ec5d3baf39d18d0d1c8a799996bf0265b98b5d48ab919",
        )
        .unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = key128();
        let plaintext = b"sealed message";

        let sealed = seal(&mut OsRng, &key, plaintext, Some(b"ctx")).unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);

        let opened = open(&key, &sealed, Some(b"ctx")).unwrap();
        assert_eq!(&*opened, plaintext);
    }

    #[test]
    fn test_seal_uses_fresh_nonce() {
        let key = key128();

        let a = seal(&mut OsRng, &key, b"same", None).unwrap();
        let b = seal(&mut OsRng, &key, b"same", None).unwrap();

        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_open_tampered_nonce_fails() {
        let key = key128();
        let mut sealed = seal(&mut OsRng, &key, b"secret", None).unwrap();
        sealed[0] ^= 0x01;

        let result = open(&key, &sealed, None);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_open_short_input_is_malformed() {
        let key = key128();
        let result = open(&key, &[0u8; NONCE_SIZE + TAG_SIZE - 1], None);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_cipher_config_validation() {
        assert!(CipherConfig::default().validate().is_ok());

        let config = CipherConfig {
            key_bits: 192,
            ..CipherConfig::default()
        };
        assert!(matches!(config.validate(), Err(CryptoError::InvalidConfig(_))));

        let config = CipherConfig {
            nonce_len: 16,
            ..CipherConfig::default()
        };
        assert!(matches!(config.validate(), Err(CryptoError::InvalidConfig(_))));
    }

    #[test]
    fn test_cipher_config_generates_configured_key() {
        let config = CipherConfig {
            key_bits: 256,
            ..CipherConfig::default()
        };
        let key = config.generate_key(&mut OsRng).unwrap();
        assert_eq!(key.bit_length(), 256);
    }
}
