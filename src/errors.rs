use core::fmt;

/// Errors that can occur in the commissioning crypto operations
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A length, encoding or value of an input was outside its domain
    InvalidArgument,
    /// The caller-provided output buffer cannot hold the result
    BufferTooSmall {
        /// Number of bytes the operation needs
        needed: usize,
    },
    /// The operation was invoked in a protocol phase that forbids it
    InvalidState,
    /// A MAC, ECDSA signature or key confirmation failed to validate
    InvalidSignature,
    /// An AEAD authentication tag failed to validate
    IntegrityCheckFailed,
    /// The underlying arithmetic, hash or encoding backend failed
    InternalError,
    /// The DRBG has not accumulated enough entropy to produce output
    OutOfEntropy,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::BufferTooSmall { needed } => {
                write!(f, "output buffer too small, {} bytes required", needed)
            }
            Error::InvalidState => f.write_str("operation invoked out of protocol order"),
            Error::InvalidSignature => f.write_str("signature verification failed"),
            Error::IntegrityCheckFailed => f.write_str("integrity check failed"),
            Error::InternalError => f.write_str("crypto backend failure"),
            Error::OutOfEntropy => f.write_str("entropy below the configured threshold"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type
pub type Result<T> = core::result::Result<T, Error>;
