//! Arithmetic façade trait.

use zeroize::Zeroize;

use crate::errors::Result;

/// Group and field arithmetic used by the SPAKE2+ state machine.
///
/// [`Spake2p`](crate::Spake2p) is generic over this trait so that the
/// protocol logic stays independent of the arithmetic backend. One
/// implementation is provided, [`NistP256`](crate::NistP256).
pub trait Group {
    /// Scalar element, an integer mod the group order
    type Scalar: Clone + Zeroize;

    /// Group element
    type Element: Clone;

    /// Length of a scalar in its big-endian wire form
    fn scalar_length() -> usize;

    /// Length of a group element in its wire form
    fn element_length() -> usize;

    /// The `M` blinding constant
    fn const_m() -> Result<Self::Element>;

    /// The `N` blinding constant
    fn const_n() -> Result<Self::Element>;

    /// The group generator
    fn generator() -> Self::Element;

    /// The identity element
    fn identity() -> Self::Element;

    /// Load a big-endian scalar, reducing it mod the group order
    fn scalar_from_bytes(bytes: &[u8]) -> Result<Self::Scalar>;

    /// Write a scalar in big-endian form
    fn scalar_to_bytes(scalar: &Self::Scalar, out: &mut [u8]) -> Result<()>;

    /// Generate a uniformly random scalar in `[1, q)`
    fn random_scalar() -> Result<Self::Scalar>;

    /// Scalar product mod the group order
    fn scalar_mul(a: &Self::Scalar, b: &Self::Scalar) -> Self::Scalar;

    /// Decode a wire-encoded element, rejecting the identity and any
    /// point that is not on the curve
    fn element_from_bytes(bytes: &[u8]) -> Result<Self::Element>;

    /// Encode an element into its wire form
    fn element_to_bytes(element: &Self::Element, out: &mut [u8]) -> Result<()>;

    /// Fixed-base scalar multiplication
    fn basepoint_mult(scalar: &Self::Scalar) -> Self::Element;

    /// Variable-base scalar multiplication
    fn scalarmult(element: &Self::Element, scalar: &Self::Scalar) -> Self::Element;

    /// `k1 * P1 + k2 * P2`
    fn double_scalarmult(
        p1: &Self::Element,
        k1: &Self::Scalar,
        p2: &Self::Element,
        k2: &Self::Scalar,
    ) -> Self::Element;

    /// Element negation
    fn element_neg(element: &Self::Element) -> Self::Element;

    /// Multiplication by the curve cofactor
    fn cofactor_mul(element: &Self::Element) -> Self::Element;

    /// True iff the element is on the curve and not the identity
    fn element_is_valid(element: &Self::Element) -> bool;

    /// Compute `w1 * G` and write it in wire form, returning the length
    fn compute_l(w1: &[u8], out: &mut [u8]) -> Result<usize>;
}
