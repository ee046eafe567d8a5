//! P-256 keypairs: ECDSA signing, ECDH agreement and CSR generation.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use x509_cert::attr::{AttributeTypeAndValue, AttributeValue};
use x509_cert::der::asn1::BitString;
use x509_cert::der::oid::ObjectIdentifier;
use x509_cert::der::{Any, Encode, Tag};
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};
use x509_cert::request::{CertReq, CertReqInfo, Version};
use x509_cert::spki::{AlgorithmIdentifier, SubjectPublicKeyInfoOwned};
use zeroize::Zeroize;

use crate::constants::{
    ECDH_SECRET_LENGTH, MAX_CSR_LENGTH, P256_PRIVATE_KEY_LENGTH, P256_PUBLIC_KEY_LENGTH,
};
use crate::drbg;
use crate::errors::{Error, Result};

// http://www.oid-info.com/get/2.5.4.10
const ORGANIZATION_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
// ecPublicKey, http://www.oid-info.com/get/1.2.840.10045.2.1
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
// prime256v1, http://www.oid-info.com/get/1.2.840.10045.3.1.7
const PRIME256V1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
// ecdsa-with-SHA256, http://www.oid-info.com/get/1.2.840.10045.4.3.2
const ECDSA_WITH_SHA256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

const KEYGEN_RETRIES: usize = 64;

/// A P-256 keypair held for device attestation and session setup.
pub struct P256Keypair {
    secret: SecretKey,
}

impl P256Keypair {
    /// Generate a keypair from the process DRBG.
    pub fn generate() -> Result<Self> {
        // Rejection sample until the draw is a valid non-zero scalar.
        for _ in 0..KEYGEN_RETRIES {
            let mut bytes = [0u8; P256_PRIVATE_KEY_LENGTH];
            drbg::fill_bytes(&mut bytes)?;
            let candidate = SecretKey::from_slice(&bytes);
            bytes.zeroize();
            if let Ok(secret) = candidate {
                return Ok(Self { secret });
            }
        }
        Err(Error::InternalError)
    }

    /// Import a raw big-endian private key.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| Error::InvalidArgument)?;
        Ok(Self { secret })
    }

    /// Write the public key in uncompressed SEC1 form, returning its
    /// length.
    pub fn public_key(&self, out: &mut [u8]) -> Result<usize> {
        if out.len() < P256_PUBLIC_KEY_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: P256_PUBLIC_KEY_LENGTH,
            });
        }
        let point = self.secret.public_key().as_affine().to_encoded_point(false);
        out[..P256_PUBLIC_KEY_LENGTH].copy_from_slice(point.as_bytes());
        Ok(P256_PUBLIC_KEY_LENGTH)
    }

    /// Write the raw big-endian private key, returning its length.
    pub fn private_key(&self, out: &mut [u8]) -> Result<usize> {
        if out.len() < P256_PRIVATE_KEY_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: P256_PRIVATE_KEY_LENGTH,
            });
        }
        out[..P256_PRIVATE_KEY_LENGTH].copy_from_slice(&self.secret.to_bytes());
        Ok(P256_PRIVATE_KEY_LENGTH)
    }

    /// ECDSA-sign `msg` with SHA-256, writing the DER signature and
    /// returning its length.
    pub fn sign_msg(&self, msg: &[u8], out: &mut [u8]) -> Result<usize> {
        let signing_key = SigningKey::from(&self.secret);
        let signature: Signature = signing_key.sign(msg);
        let der = signature.to_der();
        let bytes = der.as_bytes();
        if out.len() < bytes.len() {
            return Err(Error::BufferTooSmall {
                needed: bytes.len(),
            });
        }
        out[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Derive the ECDH shared secret with a peer public key, writing
    /// the x coordinate of the shared point and returning its length.
    pub fn derive_secret(&self, peer_public_key: &[u8], out: &mut [u8]) -> Result<usize> {
        if out.len() < ECDH_SECRET_LENGTH {
            return Err(Error::BufferTooSmall {
                needed: ECDH_SECRET_LENGTH,
            });
        }
        // from_sec1_bytes validates the point and rejects the identity.
        let peer =
            PublicKey::from_sec1_bytes(peer_public_key).map_err(|_| Error::InvalidArgument)?;
        let shared = p256::elliptic_curve::ecdh::diffie_hellman(
            self.secret.to_nonzero_scalar(),
            peer.as_affine(),
        );
        out[..ECDH_SECRET_LENGTH].copy_from_slice(shared.raw_secret_bytes().as_slice());
        Ok(ECDH_SECRET_LENGTH)
    }

    /// Produce a DER certificate signing request for the public key,
    /// signed with the private key. Returns the encoded length.
    pub fn csr(&self, out: &mut [u8]) -> Result<usize> {
        let value = AttributeValue::new(Tag::Utf8String, "CSR".as_bytes())
            .map_err(|_| Error::InternalError)?;
        let attribute = AttributeTypeAndValue {
            oid: ORGANIZATION_NAME_OID,
            value,
        };
        let rdn = RelativeDistinguishedName(
            vec![attribute].try_into().map_err(|_| Error::InternalError)?,
        );
        let subject = RdnSequence(vec![rdn]);

        let mut public_key = [0u8; P256_PUBLIC_KEY_LENGTH];
        self.public_key(&mut public_key)?;

        let info = CertReqInfo {
            version: Version::V1,
            subject,
            public_key: SubjectPublicKeyInfoOwned {
                algorithm: AlgorithmIdentifier {
                    oid: EC_PUBLIC_KEY_OID,
                    parameters: Some(
                        Any::encode_from(&PRIME256V1_OID).map_err(|_| Error::InternalError)?,
                    ),
                },
                subject_public_key: BitString::from_bytes(&public_key)
                    .map_err(|_| Error::InternalError)?,
            },
            attributes: Default::default(),
        };

        let encoded_info = info.to_der().map_err(|_| Error::InternalError)?;
        let signing_key = SigningKey::from(&self.secret);
        let signature: Signature = signing_key.sign(&encoded_info);
        let signature_der = signature.to_der();

        let request = CertReq {
            info,
            algorithm: AlgorithmIdentifier {
                oid: ECDSA_WITH_SHA256_OID,
                parameters: None,
            },
            signature: BitString::from_bytes(signature_der.as_bytes())
                .map_err(|_| Error::InternalError)?,
        };

        let encoded = request.to_der().map_err(|_| Error::InternalError)?;
        if encoded.len() > MAX_CSR_LENGTH {
            return Err(Error::InternalError);
        }
        if out.len() < encoded.len() {
            return Err(Error::BufferTooSmall {
                needed: encoded.len(),
            });
        }
        out[..encoded.len()].copy_from_slice(&encoded);
        Ok(encoded.len())
    }
}

/// Verify a DER ECDSA signature over `msg` under an uncompressed SEC1
/// public key.
pub fn verify_msg_signature(public_key: &[u8], msg: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(public_key).map_err(|_| Error::InvalidArgument)?;
    let signature = Signature::from_der(signature).map_err(|_| Error::InvalidArgument)?;
    verifying_key
        .verify(msg, &signature)
        .map_err(|_| Error::InvalidSignature)
}
