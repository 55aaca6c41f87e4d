//! Error taxonomy shared by the SIV and KMAC contexts.
//!
//! Errors are reported synchronously by the failing call; no partial state
//! is ever exposed to the caller (see each context's module docs for the
//! specifics of what gets scrubbed on failure).

/// Everything that can go wrong in this crate.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A malformed length was passed in: a tag that isn't 16 bytes, a KMAC
    /// key outside `[4, 255]` bytes, a customization string over 127 bytes,
    /// an output buffer too small for the requested digest, etc.
    #[error("invalid argument")]
    InvalidArgument,

    /// The operation is not valid for the context's current state: a second
    /// encrypt/decrypt on a SIV context, or `KmacCtx::init` without a key.
    #[error("operation not valid in the context's current state")]
    StateViolation,

    /// SIV decryption failed tag verification. The candidate plaintext has
    /// already been scrubbed by the time this is returned.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// The underlying CMAC, CTR, or sponge primitive reported failure.
    #[error("underlying cipher primitive failed")]
    UnderlyingCipherFailure,

    /// Context construction failed (e.g. the host refused an allocation).
    #[error("allocation failed")]
    AllocationFailure,
}
