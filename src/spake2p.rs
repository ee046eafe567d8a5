//! SPAKE2+ state machine.
//!
//! Implements draft-bar-cfrg-spake2plus-01 with the P-256 / SHA-256 /
//! HKDF / HMAC ciphersuite. The exchange runs strictly in phase order:
//!
//! ```text
//!     Commissioner                     Accessory
//!     ------------                     ---------
//!
//!     init
//!     begin_prover
//!     compute_round_one  ----------->
//!                                      init
//!                                      begin_verifier
//!                                  /-  compute_round_one
//!                       <-----------  compute_round_two
//!     compute_round_two  ----------->
//!     key_confirm                      key_confirm
//!     get_keys                         get_keys
//! ```
//!
//! Any operation called out of order fails with
//! [`Error::InvalidState`]; a failure inside the round computations or
//! the confirmation wipes all secret material and only a fresh
//! [`init`](Spake2p::init) revives the instance.

use zeroize::Zeroize;

use crate::constants::{
    CONFIRMATION_KEYS_INFO, MAX_CONTEXT_LENGTH, MAX_FE_LENGTH, MAX_POINT_LENGTH,
    SHA256_HASH_LENGTH, SPAKE2P_KE_LENGTH,
};
use crate::errors::{Error, Result};
use crate::group::Group;
use crate::hash;
use crate::p256::NistP256;
use crate::transcript::Transcript;

/// Which end of the exchange an instance plays.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// The commissioner, holding both password scalars
    Prover,
    /// The accessory, holding `w0` and the registration point `L`
    Verifier,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    PreInit,
    Init,
    Started,
    R1,
    R2,
    KeyConfirmed,
}

const HALF_HASH_LENGTH: usize = SHA256_HASH_LENGTH / 2;

/// A single SPAKE2+ exchange.
///
/// Instances are single-use: one `init`/`begin_*` pair drives one
/// exchange, and dropping the instance (or re-running `init`) erases
/// every secret it held.
pub struct Spake2p<G: Group> {
    role: Role,
    state: State,
    w0: G::Scalar,
    w1: G::Scalar,
    xy: G::Scalar,
    l: G::Element,
    m: G::Element,
    n: G::Element,
    // Round-one contributions in wire form: pa is always the prover's,
    // pb the verifier's, whichever side we are.
    pa: [u8; MAX_POINT_LENGTH],
    pb: [u8; MAX_POINT_LENGTH],
    ka: [u8; HALF_HASH_LENGTH],
    ke: [u8; HALF_HASH_LENGTH],
    kca: [u8; HALF_HASH_LENGTH],
    kcb: [u8; HALF_HASH_LENGTH],
    transcript: Transcript,
}

/// SPAKE2+ over P-256 with SHA-256, the ciphersuite the commissioning
/// protocol mandates.
pub type Spake2pP256 = Spake2p<NistP256>;

impl<G: Group> Spake2p<G> {
    /// Allocate an exchange in the pre-init state.
    pub fn new() -> Result<Self> {
        if G::scalar_length() > MAX_FE_LENGTH || G::element_length() > MAX_POINT_LENGTH {
            return Err(Error::InternalError);
        }
        let zero = [0u8; MAX_FE_LENGTH];
        let zero = G::scalar_from_bytes(&zero[..G::scalar_length()])?;
        Ok(Self {
            role: Role::Prover,
            state: State::PreInit,
            w0: zero.clone(),
            w1: zero.clone(),
            xy: zero,
            l: G::identity(),
            m: G::const_m()?,
            n: G::const_n()?,
            pa: [0u8; MAX_POINT_LENGTH],
            pb: [0u8; MAX_POINT_LENGTH],
            ka: [0u8; HALF_HASH_LENGTH],
            ke: [0u8; HALF_HASH_LENGTH],
            kca: [0u8; HALF_HASH_LENGTH],
            kcb: [0u8; HALF_HASH_LENGTH],
            transcript: Transcript::new(),
        })
    }

    /// Begin (or restart) an exchange with protocol-specific context.
    ///
    /// The context binds the derived keys to the surrounding protocol
    /// run; it typically covers a protocol label and the PBKDF
    /// parameter negotiation.
    pub fn init(&mut self, context: &[u8]) -> Result<()> {
        if context.len() > MAX_CONTEXT_LENGTH {
            return Err(Error::InvalidArgument);
        }
        self.wipe();
        self.transcript = Transcript::new();
        self.transcript.append(context);
        self.state = State::Init;
        Ok(())
    }

    /// Take the verifier role with the registration record `(w0, L)`.
    ///
    /// Identities may be empty when the surrounding protocol does not
    /// establish any.
    pub fn begin_verifier(
        &mut self,
        my_identity: &[u8],
        peer_identity: &[u8],
        w0: &[u8],
        l: &[u8],
    ) -> Result<()> {
        if self.state != State::Init {
            return Err(Error::InvalidState);
        }
        self.w0 = G::scalar_from_bytes(w0)?;
        self.l = G::element_from_bytes(l)?;
        // Transcript identity order is prover first, then verifier.
        self.append_identities(peer_identity, my_identity)?;
        self.role = Role::Verifier;
        self.state = State::Started;
        Ok(())
    }

    /// Take the prover role with both password scalars.
    pub fn begin_prover(
        &mut self,
        my_identity: &[u8],
        peer_identity: &[u8],
        w0: &[u8],
        w1: &[u8],
    ) -> Result<()> {
        if self.state != State::Init {
            return Err(Error::InvalidState);
        }
        self.w0 = G::scalar_from_bytes(w0)?;
        self.w1 = G::scalar_from_bytes(w1)?;
        self.append_identities(my_identity, peer_identity)?;
        self.role = Role::Prover;
        self.state = State::Started;
        Ok(())
    }

    /// Produce this side's round-one contribution, returning its length.
    pub fn compute_round_one(&mut self, out: &mut [u8]) -> Result<usize> {
        self.round_one(out).map_err(|err| {
            self.wipe();
            err
        })
    }

    /// Consume the peer's round-one contribution and produce this
    /// side's confirmation message, returning its length.
    pub fn compute_round_two(&mut self, peer: &[u8], out: &mut [u8]) -> Result<usize> {
        self.round_two(peer, out).map_err(|err| {
            self.wipe();
            err
        })
    }

    /// Check the peer's confirmation message.
    ///
    /// On mismatch the exchange fails with [`Error::InvalidSignature`]
    /// and the shared key is never released.
    pub fn key_confirm(&mut self, peer: &[u8]) -> Result<()> {
        self.confirm(peer).map_err(|err| {
            self.wipe();
            err
        })
    }

    /// Release the shared encryption key `Ke`, returning its length.
    ///
    /// Only available once `key_confirm` has succeeded.
    pub fn get_keys(&self, out: &mut [u8]) -> Result<usize> {
        if self.state != State::KeyConfirmed {
            return Err(Error::InvalidState);
        }
        if out.len() < SPAKE2P_KE_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: SPAKE2P_KE_LENGTH,
            });
        }
        out[..SPAKE2P_KE_LENGTH].copy_from_slice(&self.ke);
        Ok(SPAKE2P_KE_LENGTH)
    }

    fn round_one(&mut self, out: &mut [u8]) -> Result<usize> {
        if self.state != State::Started {
            return Err(Error::InvalidState);
        }
        let len = G::element_length();
        if out.len() < len {
            return Err(Error::BufferTooSmall { needed: len });
        }

        self.xy = G::random_scalar()?;
        let generator = G::generator();
        let blinding = match self.role {
            Role::Prover => &self.m,
            Role::Verifier => &self.n,
        };
        // pA = x*G + w0*M, pB = y*G + w0*N
        let share = G::double_scalarmult(&generator, &self.xy, blinding, &self.w0);
        if !G::element_is_valid(&share) {
            return Err(Error::InternalError);
        }

        let mut share_bytes = [0u8; MAX_POINT_LENGTH];
        G::element_to_bytes(&share, &mut share_bytes)?;
        match self.role {
            Role::Prover => self.pa = share_bytes,
            Role::Verifier => self.pb = share_bytes,
        }
        out[..len].copy_from_slice(&share_bytes[..len]);
        self.state = State::R1;
        Ok(len)
    }

    fn round_two(&mut self, peer: &[u8], out: &mut [u8]) -> Result<usize> {
        if self.state != State::R1 {
            return Err(Error::InvalidState);
        }
        let len = G::element_length();
        if peer.len() != len {
            return Err(Error::InvalidArgument);
        }
        if out.len() < SHA256_HASH_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: SHA256_HASH_LENGTH,
            });
        }

        let peer_share = G::element_from_bytes(peer)?;
        match self.role {
            Role::Prover => self.pb[..len].copy_from_slice(peer),
            Role::Verifier => self.pa[..len].copy_from_slice(peer),
        }

        let (z, v) = match self.role {
            Role::Prover => {
                // Z = h*x*(pB - w0*N), V = h*w1*(pB - w0*N); the
                // subtraction is carried out against the negated
                // constant so a single double multiplication suffices.
                let n_neg = G::element_neg(&self.n);
                let x_w0 = G::scalar_mul(&self.xy, &self.w0);
                let z = G::cofactor_mul(&G::double_scalarmult(
                    &peer_share,
                    &self.xy,
                    &n_neg,
                    &x_w0,
                ));
                let w1_w0 = G::scalar_mul(&self.w1, &self.w0);
                let v = G::cofactor_mul(&G::double_scalarmult(
                    &peer_share,
                    &self.w1,
                    &n_neg,
                    &w1_w0,
                ));
                (z, v)
            }
            Role::Verifier => {
                // Z = h*y*(pA - w0*M), V = h*y*L
                let m_neg = G::element_neg(&self.m);
                let y_w0 = G::scalar_mul(&self.xy, &self.w0);
                let z = G::cofactor_mul(&G::double_scalarmult(
                    &peer_share,
                    &self.xy,
                    &m_neg,
                    &y_w0,
                ));
                let v = G::cofactor_mul(&G::scalarmult(&self.l, &self.xy));
                (z, v)
            }
        };
        if !G::element_is_valid(&z) || !G::element_is_valid(&v) {
            return Err(Error::InternalError);
        }

        // Transcript tail: pA, pB, Z, V, w0.
        self.transcript.append(&self.pa[..len]);
        self.transcript.append(&self.pb[..len]);
        let mut point = [0u8; MAX_POINT_LENGTH];
        G::element_to_bytes(&z, &mut point)?;
        self.transcript.append(&point[..len]);
        G::element_to_bytes(&v, &mut point)?;
        self.transcript.append(&point[..len]);
        point.zeroize();
        let mut w0_bytes = [0u8; MAX_FE_LENGTH];
        G::scalar_to_bytes(&self.w0, &mut w0_bytes)?;
        self.transcript.append(&w0_bytes[..G::scalar_length()]);
        w0_bytes.zeroize();

        let mut tt = self.transcript.finish();
        self.ka.copy_from_slice(&tt[..HALF_HASH_LENGTH]);
        self.ke.copy_from_slice(&tt[HALF_HASH_LENGTH..]);
        tt.zeroize();

        let mut kca_kcb = [0u8; SHA256_HASH_LENGTH];
        hash::hkdf_sha256(&self.ka, &[], CONFIRMATION_KEYS_INFO, &mut kca_kcb)?;
        self.kca.copy_from_slice(&kca_kcb[..HALF_HASH_LENGTH]);
        self.kcb.copy_from_slice(&kca_kcb[HALF_HASH_LENGTH..]);
        kca_kcb.zeroize();

        // The prover confirms the verifier's share and vice versa.
        let confirmation = match self.role {
            Role::Prover => hash::hmac_sha256(&self.kcb, peer)?,
            Role::Verifier => hash::hmac_sha256(&self.kca, peer)?,
        };
        out[..SHA256_HASH_LENGTH].copy_from_slice(&confirmation);
        self.state = State::R2;
        Ok(SHA256_HASH_LENGTH)
    }

    fn confirm(&mut self, peer: &[u8]) -> Result<()> {
        if self.state != State::R2 {
            return Err(Error::InvalidState);
        }
        if peer.len() != SHA256_HASH_LENGTH {
            return Err(Error::InvalidArgument);
        }
        let len = G::element_length();
        match self.role {
            Role::Prover => hash::hmac_verify(&self.kca, &self.pa[..len], peer)?,
            Role::Verifier => hash::hmac_verify(&self.kcb, &self.pb[..len], peer)?,
        }
        self.state = State::KeyConfirmed;
        Ok(())
    }

    fn append_identities(&mut self, prover_id: &[u8], verifier_id: &[u8]) -> Result<()> {
        self.transcript.append(prover_id);
        self.transcript.append(verifier_id);
        let mut point = [0u8; MAX_POINT_LENGTH];
        let len = G::element_length();
        G::element_to_bytes(&self.m, &mut point)?;
        self.transcript.append(&point[..len]);
        G::element_to_bytes(&self.n, &mut point)?;
        self.transcript.append(&point[..len]);
        Ok(())
    }

    fn wipe(&mut self) {
        self.w0.zeroize();
        self.w1.zeroize();
        self.xy.zeroize();
        self.l = G::identity();
        self.pa.zeroize();
        self.pb.zeroize();
        self.ka.zeroize();
        self.ke.zeroize();
        self.kca.zeroize();
        self.kcb.zeroize();
        self.state = State::PreInit;
    }
}

impl<G: Group> Drop for Spake2p<G> {
    fn drop(&mut self) {
        self.wipe();
    }
}

/// Derive the verifier-side registration record from the PBKDF2 output.
///
/// `w0s` and `w1s` are the two halves of the stretched passcode; the
/// reduced `w0` and the point `L = w1*G` are written to the output
/// buffers, after which `w1` can be discarded.
pub fn compute_verifier<G: Group>(
    w0s: &[u8],
    w1s: &[u8],
    w0: &mut [u8],
    l: &mut [u8],
) -> Result<()> {
    let w0_scalar = G::scalar_from_bytes(w0s)?;
    G::scalar_to_bytes(&w0_scalar, w0)?;
    G::compute_l(w1s, l)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::P256_POINT_LENGTH;

    fn started_prover() -> Spake2pP256 {
        let mut pake = Spake2pP256::new().unwrap();
        pake.init(b"test context").unwrap();
        pake.begin_prover(b"", b"", &[0x11; 32], &[0x22; 32]).unwrap();
        pake
    }

    #[test]
    fn operations_fail_before_init() {
        let mut pake = Spake2pP256::new().unwrap();
        let mut out = [0u8; 65];
        assert_eq!(
            pake.begin_prover(b"", b"", &[0x11; 32], &[0x22; 32]),
            Err(Error::InvalidState)
        );
        assert_eq!(pake.compute_round_one(&mut out), Err(Error::InvalidState));
        assert_eq!(pake.get_keys(&mut out), Err(Error::InvalidState));
    }

    #[test]
    fn init_rejects_oversized_context() {
        let mut pake = Spake2pP256::new().unwrap();
        let context = [0u8; MAX_CONTEXT_LENGTH + 1];
        assert_eq!(pake.init(&context), Err(Error::InvalidArgument));
    }

    #[test]
    fn begin_verifier_rejects_bad_l() {
        let mut pake = Spake2pP256::new().unwrap();
        pake.init(b"").unwrap();
        let mut bad_l = [0u8; 65];
        bad_l[0] = 0x04;
        assert_eq!(
            pake.begin_verifier(b"", b"", &[0x11; 32], &bad_l),
            Err(Error::InvalidArgument)
        );
        // The failure happened before the exchange proper; Init is kept.
        let mut l = [0u8; 65];
        NistP256::compute_l(&[0x22; 32], &mut l).unwrap();
        pake.begin_verifier(b"", b"", &[0x11; 32], &l).unwrap();
    }

    #[test]
    fn round_one_writes_a_valid_point() {
        let mut pake = started_prover();
        let mut out = [0u8; 65];
        assert_eq!(pake.compute_round_one(&mut out).unwrap(), P256_POINT_LENGTH);
        NistP256::element_from_bytes(&out).unwrap();
    }

    #[test]
    fn round_one_reports_needed_length() {
        let mut pake = started_prover();
        let mut out = [0u8; 64];
        assert_eq!(
            pake.compute_round_one(&mut out),
            Err(Error::BufferTooSmall { needed: 65 })
        );
    }

    #[test]
    fn out_of_order_round_two_poisons_the_instance() {
        let mut pake = started_prover();
        let mut out = [0u8; 32];
        assert_eq!(
            pake.compute_round_two(&[0u8; 65], &mut out),
            Err(Error::InvalidState)
        );
        // Poisoned: even the previously legal call is now rejected.
        let mut round_one = [0u8; 65];
        assert_eq!(
            pake.compute_round_one(&mut round_one),
            Err(Error::InvalidState)
        );
        // A fresh init revives it.
        pake.init(b"test context").unwrap();
        pake.begin_prover(b"", b"", &[0x11; 32], &[0x22; 32]).unwrap();
        pake.compute_round_one(&mut round_one).unwrap();
    }

    #[test]
    fn round_two_rejects_wrong_length() {
        let mut pake = started_prover();
        let mut round_one = [0u8; 65];
        pake.compute_round_one(&mut round_one).unwrap();
        let mut out = [0u8; 32];
        assert_eq!(
            pake.compute_round_two(&[0u8; 64], &mut out),
            Err(Error::InvalidArgument)
        );
    }
}
