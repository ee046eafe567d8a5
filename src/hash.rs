//! SHA-256 family façade: one-shot and streaming hashing, HMAC, HKDF
//! and PBKDF2 as consumed by the PAKE core and the commissioning layer.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::constants::SHA256_HASH_LENGTH;
use crate::errors::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// One-shot SHA-256.
pub fn hash_sha256(data: &[u8]) -> [u8; SHA256_HASH_LENGTH] {
    let mut hash = Sha256::new();
    hash.update(data);
    hash.finalize().into()
}

/// Incremental SHA-256.
///
/// [`begin`](Self::begin) on a running context discards anything
/// already absorbed, so a single context can be reused across digests.
#[derive(Clone, Default)]
pub struct Sha256Stream {
    ctx: Sha256,
}

impl Sha256Stream {
    /// Create a fresh context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the context to its initial state.
    pub fn begin(&mut self) {
        self.ctx.reset();
    }

    /// Absorb more data.
    pub fn add_data(&mut self, data: &[u8]) {
        self.ctx.update(data);
    }

    /// Write the digest into `out` and reset the context.
    pub fn finish(&mut self, out: &mut [u8]) -> Result<()> {
        if out.len() < SHA256_HASH_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: SHA256_HASH_LENGTH,
            });
        }
        out[..SHA256_HASH_LENGTH].copy_from_slice(&self.ctx.finalize_reset());
        Ok(())
    }

    /// Discard any absorbed data.
    pub fn clear(&mut self) {
        self.ctx.reset();
    }
}

/// HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; SHA256_HASH_LENGTH]> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| Error::InvalidArgument)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Verify an HMAC-SHA256 tag.
///
/// The comparison runs in time independent of the position of any
/// mismatching byte.
pub fn hmac_verify(key: &[u8], message: &[u8], mac: &[u8]) -> Result<()> {
    if mac.len() != SHA256_HASH_LENGTH {
        return Err(Error::InvalidArgument);
    }
    let expected = hmac_sha256(key, message)?;
    if bool::from(expected[..].ct_eq(mac)) {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}

/// HKDF-SHA256 (RFC 5869). An empty `salt` selects the RFC's default of
/// a hash-length block of zero bytes; `info` may be empty.
pub fn hkdf_sha256(ikm: &[u8], salt: &[u8], info: &[u8], out: &mut [u8]) -> Result<()> {
    let salt = (!salt.is_empty()).then_some(salt);
    Hkdf::<Sha256>::new(salt, ikm)
        .expand(info, out)
        .map_err(|_| Error::InvalidArgument)
}

/// PBKDF2 with HMAC-SHA256.
pub fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) -> Result<()> {
    if iterations == 0 || out.is_empty() {
        return Err(Error::InvalidArgument);
    }
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_abc() {
        assert_eq!(
            hex::encode(hash_sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn stream_matches_one_shot() {
        let mut stream = Sha256Stream::new();
        stream.add_data(b"a");
        stream.add_data(b"bc");
        let mut out = [0u8; 32];
        stream.finish(&mut out).unwrap();
        assert_eq!(out, hash_sha256(b"abc"));
    }

    #[test]
    fn stream_begin_resets() {
        let mut stream = Sha256Stream::new();
        stream.add_data(b"discarded");
        stream.begin();
        stream.add_data(b"abc");
        let mut out = [0u8; 32];
        stream.finish(&mut out).unwrap();
        assert_eq!(out, hash_sha256(b"abc"));
    }

    #[test]
    fn stream_rejects_short_buffer() {
        let mut stream = Sha256Stream::new();
        let mut out = [0u8; 16];
        assert_eq!(
            stream.finish(&mut out),
            Err(Error::BufferTooSmall { needed: 32 })
        );
    }

    // RFC 4231 test case 1
    #[test]
    fn hmac_rfc4231_case_1() {
        let key = [0x0b; 20];
        let mac = hmac_sha256(&key, b"Hi There").unwrap();
        assert_eq!(
            hex::encode(mac),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn hmac_verify_rejects_flipped_bit() {
        let key = b"confirmation key";
        let mut mac = hmac_sha256(key, b"message").unwrap();
        hmac_verify(key, b"message", &mac).unwrap();

        mac[31] ^= 0x01;
        assert_eq!(
            hmac_verify(key, b"message", &mac),
            Err(Error::InvalidSignature)
        );
        assert_eq!(
            hmac_verify(key, b"message", &mac[..16]),
            Err(Error::InvalidArgument)
        );
    }

    // RFC 5869 test case 1
    #[test]
    fn hkdf_rfc5869_case_1() {
        let ikm = [0x0b; 22];
        let salt = hex::decode("000102030405060708090a0b0c").unwrap();
        let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();
        let mut okm = [0u8; 42];
        hkdf_sha256(&ikm, &salt, &info, &mut okm).unwrap();
        assert_eq!(
            hex::encode(okm),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf\
             34007208d5b887185865"
        );
    }

    #[test]
    fn hkdf_empty_salt_is_zero_block() {
        // RFC 5869: a missing salt is a HashLen string of zeros.
        let mut from_empty = [0u8; 32];
        hkdf_sha256(b"ikm", &[], b"info", &mut from_empty).unwrap();
        let mut from_zeros = [0u8; 32];
        hkdf_sha256(b"ikm", &[0u8; 32], b"info", &mut from_zeros).unwrap();
        assert_eq!(from_empty, from_zeros);
    }

    // PBKDF2-HMAC-SHA256 vectors for the RFC 6070 inputs
    #[test]
    fn pbkdf2_published_vectors() {
        let mut dk = [0u8; 32];

        pbkdf2_sha256(b"password", b"salt", 1, &mut dk).unwrap();
        assert_eq!(
            hex::encode(dk),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );

        pbkdf2_sha256(b"password", b"salt", 2, &mut dk).unwrap();
        assert_eq!(
            hex::encode(dk),
            "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43"
        );

        pbkdf2_sha256(b"password", b"salt", 4096, &mut dk).unwrap();
        assert_eq!(
            hex::encode(dk),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn pbkdf2_rejects_degenerate_parameters() {
        let mut dk = [0u8; 32];
        assert_eq!(
            pbkdf2_sha256(b"pw", b"salt", 0, &mut dk),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            pbkdf2_sha256(b"pw", b"salt", 1, &mut []),
            Err(Error::InvalidArgument)
        );
    }
}
