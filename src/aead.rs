//! AES-CCM authenticated encryption.
//!
//! The commissioning layer frames its session traffic with AES-CCM
//! using a 13-byte nonce and 16-byte tag, but the transport profiles
//! allow every legal CCM parameter set, so the key (128 or 256 bits),
//! nonce (7-13 bytes) and tag (4-16 bytes, even) sizes are dispatched
//! at runtime onto the type-level sizes the `ccm` crate expects.

use aes::cipher::{BlockCipher, BlockEncrypt};
use aes::{Aes128, Aes256};
use ccm::aead::generic_array::GenericArray;
use ccm::consts::{U10, U11, U12, U13, U14, U16, U4, U6, U7, U8, U9};
use ccm::{AeadInPlace, Ccm, KeyInit, NonceSize, TagSize};
use zeroize::Zeroize;

use crate::errors::{Error, Result};

macro_rules! ccm_nonce_dispatch {
    ($f:ident, $c:ty, $m:ty, $key:expr, $nonce:expr, $aad:expr, $data:expr, $tag:expr) => {
        match $nonce.len() {
            7 => $f::<$c, $m, U7>($key, $nonce, $aad, $data, $tag),
            8 => $f::<$c, $m, U8>($key, $nonce, $aad, $data, $tag),
            9 => $f::<$c, $m, U9>($key, $nonce, $aad, $data, $tag),
            10 => $f::<$c, $m, U10>($key, $nonce, $aad, $data, $tag),
            11 => $f::<$c, $m, U11>($key, $nonce, $aad, $data, $tag),
            12 => $f::<$c, $m, U12>($key, $nonce, $aad, $data, $tag),
            13 => $f::<$c, $m, U13>($key, $nonce, $aad, $data, $tag),
            _ => Err(Error::InvalidArgument),
        }
    };
}

macro_rules! ccm_tag_dispatch {
    ($f:ident, $c:ty, $key:expr, $nonce:expr, $aad:expr, $data:expr, $tag:expr) => {
        match $tag.len() {
            4 => ccm_nonce_dispatch!($f, $c, U4, $key, $nonce, $aad, $data, $tag),
            6 => ccm_nonce_dispatch!($f, $c, U6, $key, $nonce, $aad, $data, $tag),
            8 => ccm_nonce_dispatch!($f, $c, U8, $key, $nonce, $aad, $data, $tag),
            10 => ccm_nonce_dispatch!($f, $c, U10, $key, $nonce, $aad, $data, $tag),
            12 => ccm_nonce_dispatch!($f, $c, U12, $key, $nonce, $aad, $data, $tag),
            14 => ccm_nonce_dispatch!($f, $c, U14, $key, $nonce, $aad, $data, $tag),
            16 => ccm_nonce_dispatch!($f, $c, U16, $key, $nonce, $aad, $data, $tag),
            _ => Err(Error::InvalidArgument),
        }
    };
}

macro_rules! ccm_dispatch {
    ($f:ident, $key:expr, $nonce:expr, $aad:expr, $data:expr, $tag:expr) => {
        match $key.len() {
            16 => ccm_tag_dispatch!($f, Aes128, $key, $nonce, $aad, $data, $tag),
            32 => ccm_tag_dispatch!($f, Aes256, $key, $nonce, $aad, $data, $tag),
            _ => Err(Error::InvalidArgument),
        }
    };
}

fn seal<C, M, N>(key: &[u8], nonce: &[u8], aad: &[u8], data: &mut [u8], tag: &mut [u8]) -> Result<()>
where
    C: BlockCipher<BlockSize = U16> + BlockEncrypt + KeyInit,
    M: TagSize + aes::cipher::ArrayLength<u8>,
    N: NonceSize + aes::cipher::ArrayLength<u8>,
{
    let cipher = Ccm::<C, M, N>::new_from_slice(key).map_err(|_| Error::InvalidArgument)?;
    let computed = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, data)
        .map_err(|_| Error::InternalError)?;
    tag.copy_from_slice(&computed);
    Ok(())
}

fn open<C, M, N>(key: &[u8], nonce: &[u8], aad: &[u8], data: &mut [u8], tag: &[u8]) -> Result<()>
where
    C: BlockCipher<BlockSize = U16> + BlockEncrypt + KeyInit,
    M: TagSize + aes::cipher::ArrayLength<u8>,
    N: NonceSize + aes::cipher::ArrayLength<u8>,
{
    let cipher = Ccm::<C, M, N>::new_from_slice(key).map_err(|_| Error::InvalidArgument)?;
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            aad,
            data,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| Error::IntegrityCheckFailed)
}

/// AES-CCM encryption with a detached tag.
///
/// The ciphertext is written to `ciphertext` (which must hold at least
/// `plaintext.len()` bytes) and the authentication tag to `tag`, whose
/// length selects the tag size.
pub fn aes_ccm_encrypt(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    ciphertext: &mut [u8],
    tag: &mut [u8],
) -> Result<()> {
    if ciphertext.len() < plaintext.len() {
        return Err(Error::BufferTooSmall {
            needed: plaintext.len(),
        });
    }
    let data = &mut ciphertext[..plaintext.len()];
    data.copy_from_slice(plaintext);
    ccm_dispatch!(seal, key, nonce, aad, data, tag)
}

/// AES-CCM decryption with a detached tag.
///
/// On tag mismatch the output buffer is wiped and the call fails with
/// [`Error::IntegrityCheckFailed`]; no plaintext escapes.
pub fn aes_ccm_decrypt(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    plaintext: &mut [u8],
) -> Result<()> {
    if plaintext.len() < ciphertext.len() {
        return Err(Error::BufferTooSmall {
            needed: ciphertext.len(),
        });
    }
    let data = &mut plaintext[..ciphertext.len()];
    data.copy_from_slice(ciphertext);
    let verdict = ccm_dispatch!(open, key, nonce, aad, data, tag);
    if verdict.is_err() {
        data.zeroize();
    }
    verdict
}
