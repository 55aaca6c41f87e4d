//! [AES-SIV-128][1] ([RFC 5297][2]): deterministic, nonce-misuse-resistant
//! [Authenticated Encryption with Associated Data (AEAD)][3], and
//! [KMAC128/KMAC256][4] ([NIST SP 800-185][5]): keyed message authentication
//! and extendable-output functions built on cSHAKE.
//!
//! [1]: https://en.wikipedia.org/wiki/AES-SIV
//! [2]: https://tools.ietf.org/html/rfc5297
//! [3]: https://en.wikipedia.org/wiki/Authenticated_encryption
//! [4]: https://en.wikipedia.org/wiki/SHA-3#Instances
//! [5]: https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-185.pdf
//!
//! Both primitives share a skeleton: an opaque context holding keyed state,
//! a streaming-input interface for associated data or message bytes, and a
//! finalization step that produces either ciphertext+tag ([`siv`]) or a
//! caller-chosen-length digest ([`kmac`]).
//!
//! This crate does not implement the AES block cipher or the Keccak-f\[1600\]
//! permutation / cSHAKE absorb-squeeze engine itself; those come from the
//! [`aes`] and [`sha3`] crates respectively. What lives here is the S2V
//! doubling construction, the SP 800-185 bit-level encoding rules, and the
//! streaming state machines that give both primitives their
//! one-shot-correct, misuse-resistant contracts.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod encoding;
pub mod error;
pub mod gf128;
pub mod kmac;
pub mod siv;

pub use error::Error;
pub use kmac::{KmacCtx, KmacParams, KmacVariant};
pub use siv::{FinalResult, SivCtx};

#[cfg(test)]
extern crate std;
