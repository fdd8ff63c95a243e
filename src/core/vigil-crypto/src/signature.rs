//! RSA-PSS digital signatures.
//!
//! Messages are hashed with the configured digest and signed with the
//! probabilistic signature scheme (PSS), MGF1 using the same digest.
//! The salt length and digest chosen at signing time must be reproduced at
//! verification time; any difference makes an otherwise correct signature
//! fail to verify.
//!
//! Defaults: 2048-bit modulus, public exponent 65537, SHA-256, 32-byte salt.

use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};
use tracing::{debug, info};

use crate::error::CryptoError;
use crate::random::{CheckedRng, SecureRandom};

/// Smallest accepted modulus, in bits.
pub const MIN_KEY_SIZE: usize = 2048;

/// Smallest accepted public exponent. Exponents must also be odd.
pub const MIN_PUBLIC_EXPONENT: u64 = 65537;

/// Smallest accepted PSS salt, in bytes.
pub const MIN_SALT_LEN: usize = 16;

/// Message digest used for signing and for MGF1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// SHA-256 (default).
    #[default]
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Digest output size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha384 => Sha384::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }

    /// Padding for signing. The private-key operation is blinded.
    fn pss_signer(self, salt_len: usize) -> Pss {
        match self {
            Self::Sha256 => Pss::new_blinded_with_salt::<Sha256>(salt_len),
            Self::Sha384 => Pss::new_blinded_with_salt::<Sha384>(salt_len),
            Self::Sha512 => Pss::new_blinded_with_salt::<Sha512>(salt_len),
        }
    }

    fn pss_verifier(self, salt_len: usize) -> Pss {
        match self {
            Self::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
            Self::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
            Self::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Sha384 => write!(f, "sha384"),
            Self::Sha512 => write!(f, "sha512"),
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(CryptoError::InvalidConfig(format!(
                "unknown hash algorithm: {}",
                s
            ))),
        }
    }
}

/// Hash and padding parameters shared by the signer and the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PssParams {
    /// Message digest (also used by MGF1).
    pub hash: HashAlgorithm,
    /// PSS salt length in bytes.
    pub salt_len: usize,
}

impl Default for PssParams {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::Sha256,
            salt_len: 32,
        }
    }
}

impl PssParams {
    /// Validates the parameters against the documented minimums.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.salt_len < MIN_SALT_LEN {
            return Err(CryptoError::InvalidConfig(format!(
                "salt_len must be >= {} bytes, got {}",
                MIN_SALT_LEN, self.salt_len
            )));
        }
        Ok(())
    }
}

/// Key generation and signing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureConfig {
    /// Modulus size in bits (>= [`MIN_KEY_SIZE`]).
    pub key_size: usize,
    /// Public exponent (odd, >= [`MIN_PUBLIC_EXPONENT`]).
    pub public_exponent: u64,
    /// Message digest.
    pub hash: HashAlgorithm,
    /// PSS salt length in bytes (>= [`MIN_SALT_LEN`]).
    pub salt_len: usize,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            key_size: MIN_KEY_SIZE,
            public_exponent: MIN_PUBLIC_EXPONENT,
            hash: HashAlgorithm::Sha256,
            salt_len: 32,
        }
    }
}

impl SignatureConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.key_size < MIN_KEY_SIZE {
            return Err(CryptoError::InvalidConfig(format!(
                "key_size must be >= {} bits, got {}",
                MIN_KEY_SIZE, self.key_size
            )));
        }
        if self.public_exponent < MIN_PUBLIC_EXPONENT || self.public_exponent % 2 == 0 {
            return Err(CryptoError::InvalidConfig(format!(
                "public_exponent must be odd and >= {}, got {}",
                MIN_PUBLIC_EXPONENT, self.public_exponent
            )));
        }
        self.params().validate()?;

        // EMSA-PSS needs emLen >= hLen + sLen + 2.
        let em_len = (self.key_size - 1).div_ceil(8);
        if self.hash.output_len() + self.salt_len + 2 > em_len {
            return Err(CryptoError::InvalidConfig(format!(
                "salt_len {} too large for a {}-bit key with {}",
                self.salt_len, self.key_size, self.hash
            )));
        }
        Ok(())
    }

    /// The hash and padding parameters to use at both ends.
    pub fn params(&self) -> PssParams {
        PssParams {
            hash: self.hash,
            salt_len: self.salt_len,
        }
    }
}

/// An RSA key pair. The private half never leaves this process.
#[derive(Clone)]
pub struct SigningKeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl SigningKeyPair {
    /// Returns the private key.
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Returns the public key, which may be shared freely.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("bits", &(self.public.size() * 8))
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// A detached RSA-PSS signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wraps raw signature bytes, e.g. after decoding a transport encoding.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Generates a new RSA key pair according to `config`.
///
/// # Errors
///
/// Returns [`CryptoError::RandomSourceFailed`] if `rng` fails at any point
/// during generation. The partially generated key is discarded.
pub fn generate_keypair<R: SecureRandom>(
    rng: &mut R,
    config: &SignatureConfig,
) -> Result<SigningKeyPair, CryptoError> {
    config.validate()?;

    let exponent = BigUint::from(config.public_exponent);
    let mut checked = CheckedRng::new(rng);
    let result = RsaPrivateKey::new_with_exp(&mut checked, config.key_size, &exponent);
    checked.finish()?;
    let private = result.map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
    let public = RsaPublicKey::from(&private);

    info!(key_size = config.key_size, "RSA key pair generated");

    Ok(SigningKeyPair { private, public })
}

/// Signs `message` with `private_key`.
///
/// Signing is randomized (salt) and the private-key operation is blinded,
/// so two signatures over the same message differ while both verify.
///
/// # Errors
///
/// Returns [`CryptoError::RandomSourceFailed`] if `rng` fails while drawing
/// the salt or the blinding factor; no signature is released in that case.
pub fn sign<R: SecureRandom>(
    rng: &mut R,
    private_key: &RsaPrivateKey,
    message: &[u8],
    params: &PssParams,
) -> Result<Signature, CryptoError> {
    params.validate()?;
    check_key_size(private_key)?;

    let hashed = params.hash.digest(message);
    let mut checked = CheckedRng::new(rng);
    let result = private_key.sign_with_rng(
        &mut checked,
        params.hash.pss_signer(params.salt_len),
        &hashed,
    );
    checked.finish()?;
    let bytes = result.map_err(|e| CryptoError::SignatureFailed(e.to_string()))?;

    debug!(hash = %params.hash, salt_len = params.salt_len, "message signed");

    Ok(Signature(bytes))
}

/// Verifies `signature` over `message` with `public_key`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] for any mismatch: altered
/// message, wrong key, different hash or salt length, malformed signature.
/// Returns [`CryptoError::InvalidKey`] for a public key below
/// [`MIN_KEY_SIZE`], whatever the signature.
pub fn verify(
    public_key: &RsaPublicKey,
    message: &[u8],
    signature: &Signature,
    params: &PssParams,
) -> Result<(), CryptoError> {
    params.validate()?;
    check_key_size(public_key)?;

    let hashed = params.hash.digest(message);
    public_key
        .verify(params.hash.pss_verifier(params.salt_len), &hashed, signature.as_bytes())
        .map_err(|_| CryptoError::InvalidSignature)
}

fn check_key_size<K: PublicKeyParts>(key: &K) -> Result<(), CryptoError> {
    if key.size() * 8 < MIN_KEY_SIZE {
        return Err(CryptoError::InvalidKey(format!(
            "RSA key must be >= {} bits",
            MIN_KEY_SIZE
        )));
    }
    Ok(())
}
