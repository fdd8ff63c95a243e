//! Cryptographically secure random generation.
//!
//! Randomness is handed to every generating operation as a capability
//! instead of being pulled from a process global. Production code passes
//! [`OsRng`], the operating system's CSPRNG; tests may pass a seeded
//! `rand::rngs::StdRng` to make keys and nonces reproducible.

use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use zeroize::Zeroizing;

use crate::aead::NONCE_SIZE;
use crate::error::CryptoError;
use crate::keys::Nonce;

pub use rand::rngs::OsRng;

/// A source of cryptographically secure random bytes.
///
/// Blanket-implemented for every `RngCore + CryptoRng`. Generators without
/// the `CryptoRng` marker (e.g. `SmallRng`) are rejected at compile time.
pub trait SecureRandom: RngCore + CryptoRng {}

impl<T: RngCore + CryptoRng> SecureRandom for T {}

/// Fills `dest` from `rng`, surfacing entropy failures instead of panicking.
pub fn fill<R: SecureRandom>(rng: &mut R, dest: &mut [u8]) -> Result<(), CryptoError> {
    rng.try_fill_bytes(dest)
        .map_err(|e| CryptoError::RandomSourceFailed(e.to_string()))
}

/// Generates a fresh random nonce for AES-GCM.
///
/// Every call draws independently; a (key, nonce) pair must still never be
/// used for two distinct plaintexts.
pub fn generate_nonce<R: SecureRandom>(rng: &mut R) -> Result<Nonce, CryptoError> {
    let mut bytes = [0u8; NONCE_SIZE];
    fill(rng, &mut bytes)?;
    Ok(Nonce::from_array(bytes))
}

/// Generates `len` cryptographically secure random bytes.
///
/// The buffer is wrapped in `Zeroizing` since callers mostly use it as key
/// material.
pub fn generate_bytes<R: SecureRandom>(
    rng: &mut R,
    len: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    fill(rng, &mut bytes)?;
    Ok(bytes)
}

/// Routes every draw through `try_fill_bytes` for consumers that only call
/// the infallible `fill_bytes` (the `rsa` crate).
///
/// The first failure is recorded and later draws come from a fixed filler
/// stream so the consumer still terminates. Anything produced after a
/// failure is garbage; [`CheckedRng::finish`] reports the failure and the
/// caller must drop the result.
pub(crate) struct CheckedRng<'a, R> {
    inner: &'a mut R,
    filler: Option<StdRng>,
    error: Option<rand::Error>,
}

impl<'a, R: SecureRandom> CheckedRng<'a, R> {
    pub(crate) fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            filler: None,
            error: None,
        }
    }

    /// Returns the first failure of the wrapped source, if any.
    pub(crate) fn finish(self) -> Result<(), CryptoError> {
        match self.error {
            Some(e) => Err(CryptoError::RandomSourceFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

impl<R: SecureRandom> RngCore for CheckedRng<'_, R> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if self.error.is_none() {
            match self.inner.try_fill_bytes(dest) {
                Ok(()) => return,
                Err(e) => self.error = Some(e),
            }
        }
        self.filler
            .get_or_insert_with(|| StdRng::seed_from_u64(0))
            .fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl<R: SecureRandom> CryptoRng for CheckedRng<'_, R> {}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    /// An entropy source that always fails.
    pub(crate) struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn test_generate_nonce_length() {
        let nonce = generate_nonce(&mut OsRng).unwrap();
        assert_eq!(nonce.as_bytes().len(), NONCE_SIZE);
    }

    #[test]
    fn test_generate_nonce_unique() {
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let nonce = generate_nonce(&mut OsRng).unwrap();
            assert!(seen.insert(*nonce.as_bytes()), "duplicate nonce generated");
        }
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);

        assert_eq!(generate_nonce(&mut a).unwrap(), generate_nonce(&mut b).unwrap());
        assert_eq!(
            *generate_bytes(&mut a, 32).unwrap(),
            *generate_bytes(&mut b, 32).unwrap()
        );
    }

    #[test]
    fn test_generate_bytes_length() {
        for len in [0, 1, 16, 32, 64, 128] {
            let bytes = generate_bytes(&mut OsRng, len).unwrap();
            assert_eq!(bytes.len(), len);
        }
    }

    /// Wraps a source and counts the bytes drawn from it.
    pub(crate) struct CountingRng<R> {
        pub(crate) inner: R,
        pub(crate) drawn: usize,
    }

    impl<R: RngCore> RngCore for CountingRng<R> {
        fn next_u32(&mut self) -> u32 {
            self.drawn += 4;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.drawn += 8;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.drawn += dest.len();
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.drawn += dest.len();
            self.inner.try_fill_bytes(dest)
        }
    }

    impl<R: CryptoRng> CryptoRng for CountingRng<R> {}

    #[test]
    fn test_checked_rng_passes_through() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);

        let mut checked = CheckedRng::new(&mut a);
        let mut out = [0u8; 32];
        checked.fill_bytes(&mut out);
        checked.finish().unwrap();

        let mut expected = [0u8; 32];
        b.fill_bytes(&mut expected);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_checked_rng_records_failure() {
        let mut source = FailingRng;
        let mut checked = CheckedRng::new(&mut source);

        let mut out = [0u8; 16];
        checked.fill_bytes(&mut out);
        checked.fill_bytes(&mut out);

        assert!(matches!(
            checked.finish(),
            Err(CryptoError::RandomSourceFailed(_))
        ));
    }

    #[test]
    fn test_failing_source_is_reported() {
        let result = generate_nonce(&mut FailingRng);
        assert!(matches!(result, Err(CryptoError::RandomSourceFailed(_))));

        let result = generate_bytes(&mut FailingRng, 16);
        assert!(matches!(result, Err(CryptoError::RandomSourceFailed(_))));
    }
}
