//! SPAKE2+ password-authenticated key exchange for device commissioning.
//!
//! This library implements the SPAKE2+ protocol (draft-bar-cfrg-spake2plus-01)
//! with the P-256 / SHA-256 / HKDF / HMAC ciphersuite, together with the
//! surrounding crypto primitives a commissioning layer consumes: AES-CCM,
//! ECDSA, ECDH, PBKDF2, a seedable process DRBG and keypair/CSR generation.
//!
//! SPAKE2+ is an augmented PAKE: the commissioner (the *prover*) holds two
//! scalars `w0` and `w1` stretched from a low-entropy passcode, while the
//! accessory (the *verifier*) is provisioned with `w0` and the point
//! `L = w1*G` instead of the passcode itself. A passive attacker learns
//! nothing from the exchange; an active attacker gets a single passcode
//! guess per run, and compromising the accessory does not directly reveal
//! the passcode.
//!
//! # Protocol flow
//!
//! Both sides build a [`Spake2p`] instance, bind it to the surrounding
//! protocol run with [`init`](Spake2p::init), then load their secrets with
//! [`begin_prover`](Spake2p::begin_prover) or
//! [`begin_verifier`](Spake2p::begin_verifier). Each side emits a 65-byte
//! round-one share, consumes the peer's share in round two to produce a
//! 32-byte confirmation MAC, verifies the peer's confirmation, and only
//! then reads out the shared 16-byte encryption key `Ke`:
//!
//! ```text
//!     Commissioner                     Accessory
//!     ------------                     ---------
//!     compute_round_one  -- pA ----->
//!                        <---- pB --   compute_round_one
//!                        <---- cB --   compute_round_two(pA)
//!     compute_round_two(pB) -- cA -->
//!     key_confirm(cB)                  key_confirm(cA)
//!     get_keys                         get_keys
//! ```
//!
//! # Usage
//!
//! ```
//! use spake2p::{compute_verifier, hash, NistP256, Spake2pP256};
//!
//! # fn main() -> spake2p::Result<()> {
//! const CONTEXT: &[u8] = b"PAKE V1 Commissioning";
//!
//! // Stretch the passcode; the accessory stores (w0, L), not the passcode.
//! let mut w0w1s = [0u8; 80];
//! hash::pbkdf2_sha256(b"20202021", b"SPAKE2P Key Salt", 2000, &mut w0w1s)?;
//! let (w0s, w1s) = w0w1s.split_at(40);
//! let mut w0 = [0u8; 32];
//! let mut l = [0u8; 65];
//! compute_verifier::<NistP256>(w0s, w1s, &mut w0, &mut l)?;
//!
//! let mut prover = Spake2pP256::new()?;
//! prover.init(CONTEXT)?;
//! prover.begin_prover(b"", b"", w0s, w1s)?;
//!
//! let mut verifier = Spake2pP256::new()?;
//! verifier.init(CONTEXT)?;
//! verifier.begin_verifier(b"", b"", &w0, &l)?;
//!
//! let mut pa = [0u8; 65];
//! prover.compute_round_one(&mut pa)?;
//! let mut pb = [0u8; 65];
//! verifier.compute_round_one(&mut pb)?;
//!
//! let mut cb = [0u8; 32];
//! verifier.compute_round_two(&pa, &mut cb)?;
//! let mut ca = [0u8; 32];
//! prover.compute_round_two(&pb, &mut ca)?;
//!
//! // Each side checks the other's confirmation before releasing Ke.
//! prover.key_confirm(&cb)?;
//! verifier.key_confirm(&ca)?;
//!
//! let mut ke_prover = [0u8; 16];
//! prover.get_keys(&mut ke_prover)?;
//! let mut ke_verifier = [0u8; 16];
//! verifier.get_keys(&mut ke_verifier)?;
//! assert_eq!(ke_prover, ke_verifier);
//! # Ok(())
//! # }
//! ```
//!
//! # Identities and context
//!
//! The optional identity strings and the context are hashed into the key
//! derivation transcript, binding the derived keys to one pair of parties
//! and one protocol run. Both sides must agree on all three, or key
//! confirmation fails.
//!
//! # Security
//!
//! Secret material is zeroized when an instance is dropped, re-initialized
//! or hits a failure mid-exchange, and MAC comparisons run in constant
//! time. Scalar and point arithmetic inherit the constant-time discipline
//! of the backing `p256` implementation. Randomness comes from a
//! process-wide SP 800-90A HMAC_DRBG ([`drbg`]) that hosts can feed from
//! their own entropy sources.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod aead;
pub mod constants;
pub mod drbg;
pub mod hash;
pub mod keypair;

mod errors;
mod group;
mod p256;
mod spake2p;
mod transcript;

pub use self::{
    errors::{Error, Result},
    group::Group,
    keypair::{verify_msg_signature, P256Keypair},
    p256::NistP256,
    spake2p::{compute_verifier, Role, Spake2p, Spake2pP256},
    transcript::Transcript,
};
