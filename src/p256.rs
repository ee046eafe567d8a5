//! P-256 instantiation of the arithmetic façade.

use elliptic_curve::bigint::{Encoding, NonZero, U256, U384};
use elliptic_curve::group::Group as _;
use elliptic_curve::ops::Reduce;
use elliptic_curve::sec1::{Coordinates, FromEncodedPoint, ToEncodedPoint};
use elliptic_curve::{Field, PrimeField};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};

use crate::constants::{
    P256_FE_LENGTH, P256_POINT_LENGTH, SPAKE2P_M_P256, SPAKE2P_N_P256,
};
use crate::drbg;
use crate::errors::{Error, Result};
use crate::group::Group;

/// Widest big-endian scalar input accepted before reduction. Covers the
/// 40-byte PBKDF2 halves the passcode stretching produces.
const MAX_SCALAR_INPUT: usize = 48;

/// The P-256 group order, left-padded to the wide-reduction width.
const ORDER_WIDE: [u8; MAX_SCALAR_INPUT] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc,
    0x63, 0x25, 0x51,
];

const RANDOM_SCALAR_RETRIES: usize = 64;

/// NIST P-256 arithmetic backed by the `p256` crate.
pub struct NistP256;

impl NistP256 {
    // w = in mod q for inputs wider than one field element.
    fn reduce_wide(bytes: &[u8]) -> Result<Scalar> {
        let mut padded = [0u8; MAX_SCALAR_INPUT];
        padded[MAX_SCALAR_INPUT - bytes.len()..].copy_from_slice(bytes);
        let value = U384::from_be_slice(&padded);
        let order = Option::<NonZero<U384>>::from(NonZero::new(U384::from_be_slice(&ORDER_WIDE)))
            .ok_or(Error::InternalError)?;
        let reduced = value.rem(&order);
        let repr =
            FieldBytes::clone_from_slice(&reduced.to_be_bytes()[MAX_SCALAR_INPUT - P256_FE_LENGTH..]);
        Option::<Scalar>::from(Scalar::from_repr(repr)).ok_or(Error::InternalError)
    }
}

impl Group for NistP256 {
    type Scalar = Scalar;
    type Element = ProjectivePoint;

    fn scalar_length() -> usize {
        P256_FE_LENGTH
    }

    fn element_length() -> usize {
        P256_POINT_LENGTH
    }

    fn const_m() -> Result<ProjectivePoint> {
        Self::element_from_bytes(&SPAKE2P_M_P256)
    }

    fn const_n() -> Result<ProjectivePoint> {
        Self::element_from_bytes(&SPAKE2P_N_P256)
    }

    fn generator() -> ProjectivePoint {
        ProjectivePoint::GENERATOR
    }

    fn identity() -> ProjectivePoint {
        ProjectivePoint::IDENTITY
    }

    fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
        match bytes.len() {
            0 => Err(Error::InvalidArgument),
            n if n < P256_FE_LENGTH => {
                let mut padded = [0u8; P256_FE_LENGTH];
                padded[P256_FE_LENGTH - n..].copy_from_slice(bytes);
                Ok(<Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(
                    &padded,
                )))
            }
            P256_FE_LENGTH => Ok(<Scalar as Reduce<U256>>::reduce_bytes(
                FieldBytes::from_slice(bytes),
            )),
            n if n <= MAX_SCALAR_INPUT => Self::reduce_wide(bytes),
            _ => Err(Error::InvalidArgument),
        }
    }

    fn scalar_to_bytes(scalar: &Scalar, out: &mut [u8]) -> Result<()> {
        if out.len() < P256_FE_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: P256_FE_LENGTH,
            });
        }
        out[..P256_FE_LENGTH].copy_from_slice(&scalar.to_bytes());
        Ok(())
    }

    fn random_scalar() -> Result<Scalar> {
        // Rejection sample DRBG output until it lands in [1, q).
        for _ in 0..RANDOM_SCALAR_RETRIES {
            let mut repr = FieldBytes::default();
            drbg::fill_bytes(repr.as_mut_slice())?;
            if let Some(scalar) = Option::<Scalar>::from(Scalar::from_repr(repr)) {
                if !bool::from(scalar.is_zero()) {
                    return Ok(scalar);
                }
            }
        }
        Err(Error::InternalError)
    }

    fn scalar_mul(a: &Scalar, b: &Scalar) -> Scalar {
        a * b
    }

    fn element_from_bytes(bytes: &[u8]) -> Result<ProjectivePoint> {
        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| Error::InvalidArgument)?;
        if !matches!(encoded.coordinates(), Coordinates::Uncompressed { .. }) {
            return Err(Error::InvalidArgument);
        }
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or(Error::InvalidArgument)?;
        Ok(ProjectivePoint::from(affine))
    }

    fn element_to_bytes(element: &ProjectivePoint, out: &mut [u8]) -> Result<()> {
        if out.len() < P256_POINT_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: P256_POINT_LENGTH,
            });
        }
        let encoded = element.to_affine().to_encoded_point(false);
        let bytes = encoded.as_bytes();
        if bytes.len() != P256_POINT_LENGTH {
            // The identity has no uncompressed SEC1 form.
            return Err(Error::InvalidArgument);
        }
        out[..P256_POINT_LENGTH].copy_from_slice(bytes);
        Ok(())
    }

    fn basepoint_mult(scalar: &Scalar) -> ProjectivePoint {
        ProjectivePoint::GENERATOR * scalar
    }

    fn scalarmult(element: &ProjectivePoint, scalar: &Scalar) -> ProjectivePoint {
        element * scalar
    }

    fn double_scalarmult(
        p1: &ProjectivePoint,
        k1: &Scalar,
        p2: &ProjectivePoint,
        k2: &Scalar,
    ) -> ProjectivePoint {
        (p1 * k1) + (p2 * k2)
    }

    fn element_neg(element: &ProjectivePoint) -> ProjectivePoint {
        -*element
    }

    fn cofactor_mul(element: &ProjectivePoint) -> ProjectivePoint {
        // The P-256 cofactor is 1.
        *element
    }

    fn element_is_valid(element: &ProjectivePoint) -> bool {
        !bool::from(element.is_identity())
    }

    fn compute_l(w1: &[u8], out: &mut [u8]) -> Result<usize> {
        let w1 = Self::scalar_from_bytes(w1)?;
        Self::element_to_bytes(&Self::basepoint_mult(&w1), out)?;
        Ok(P256_POINT_LENGTH)
    }
}
