//! Sizes and curve constants shared by the protocol and the primitives.

/// P-256 field element / scalar size in bytes.
pub const P256_FE_LENGTH: usize = 32;

/// Uncompressed SEC1 point size (`0x04 || X || Y`).
pub const P256_POINT_LENGTH: usize = 2 * P256_FE_LENGTH + 1;

/// SHA-256 digest size.
pub const SHA256_HASH_LENGTH: usize = 32;

/// P-256 private key size.
pub const P256_PRIVATE_KEY_LENGTH: usize = P256_FE_LENGTH;

/// P-256 public key size (uncompressed SEC1 point).
pub const P256_PUBLIC_KEY_LENGTH: usize = P256_POINT_LENGTH;

/// Upper bound for a DER-encoded ECDSA P-256 signature.
pub const MAX_ECDSA_SIGNATURE_LENGTH: usize = 72;

/// ECDH shared secret size (x coordinate of the shared point).
pub const ECDH_SECRET_LENGTH: usize = P256_FE_LENGTH;

/// Upper bound for a generated certificate signing request.
pub const MAX_CSR_LENGTH: usize = 512;

/// Largest context accepted by [`Spake2p::init`](crate::Spake2p::init).
pub const MAX_CONTEXT_LENGTH: usize = 1024;

/// Largest field element any supported group uses.
pub const MAX_FE_LENGTH: usize = P256_FE_LENGTH;

/// Largest wire-encoded point any supported group uses.
pub const MAX_POINT_LENGTH: usize = P256_POINT_LENGTH;

/// Size of the shared encryption key released by a completed exchange.
pub const SPAKE2P_KE_LENGTH: usize = SHA256_HASH_LENGTH / 2;

/// Size of a round-two confirmation message.
pub const SPAKE2P_CONFIRMATION_LENGTH: usize = SHA256_HASH_LENGTH;

/// Info string for the confirmation key derivation step.
pub(crate) const CONFIRMATION_KEYS_INFO: &[u8] = b"ConfirmationKeys";

/// SPAKE2+ `M` point for P-256, from draft-bar-cfrg-spake2plus-01.
pub const SPAKE2P_M_P256: [u8; P256_POINT_LENGTH] = [
    0x04, 0x88, 0x6e, 0x2f, 0x97, 0xac, 0xe4, 0x6e, 0x55, 0xba, 0x9d, 0xd7, 0x24, 0x25, 0x79, 0xf2,
    0x99, 0x3b, 0x64, 0xe1, 0x6e, 0xf3, 0xdc, 0xab, 0x95, 0xaf, 0xd4, 0x97, 0x33, 0x3d, 0x8f, 0xa1,
    0x2f, 0x5f, 0xf3, 0x55, 0x16, 0x3e, 0x43, 0xce, 0x22, 0x4e, 0x0b, 0x0e, 0x65, 0xff, 0x02, 0xac,
    0x8e, 0x5c, 0x7b, 0xe0, 0x94, 0x19, 0xc7, 0x85, 0xe0, 0xca, 0x54, 0x7d, 0x55, 0xa1, 0x2e, 0x2d,
    0x20,
];

/// SPAKE2+ `N` point for P-256, from draft-bar-cfrg-spake2plus-01.
pub const SPAKE2P_N_P256: [u8; P256_POINT_LENGTH] = [
    0x04, 0xd8, 0xbb, 0xd6, 0xc6, 0x39, 0xc6, 0x29, 0x37, 0xb0, 0x4d, 0x99, 0x7f, 0x38, 0xc3, 0x77,
    0x07, 0x19, 0xc6, 0x29, 0xd7, 0x01, 0x4d, 0x49, 0xa2, 0x4b, 0x4f, 0x98, 0xba, 0xa1, 0x29, 0x2b,
    0x49, 0x07, 0xd6, 0x0a, 0xa6, 0xbf, 0xad, 0xe4, 0x50, 0x08, 0xa6, 0x36, 0x33, 0x7f, 0x51, 0x68,
    0xc6, 0x4d, 0x9b, 0xd3, 0x60, 0x34, 0x80, 0x8c, 0xd5, 0x64, 0x49, 0x0b, 0x1e, 0x65, 0x6e, 0xdb,
    0xe7,
];
