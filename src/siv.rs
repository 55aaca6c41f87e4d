//! AES-SIV-128 ([RFC 5297](https://tools.ietf.org/html/rfc5297)): a
//! deterministic authenticated-encryption mode built from CMAC-based S2V
//! (for the synthetic IV / tag) and AES-CTR (for the keystream).
//!
//! ```text
//! caller -> new(key) -> aad(segment)* -> encrypt(plaintext) -> (tag, ciphertext)
//!        -> set_tag(tag); aad(segment)*; decrypt(ciphertext) -> plaintext
//! ```
//!
//! Each context performs at most one `encrypt` or `decrypt` call in its
//! lifetime; re-initialize with [`SivCtx::init`] to reuse the allocation for
//! another message.

use aes::Aes128;
use cipher::{KeyInit, KeyIvInit, StreamCipher};
use cmac::Cmac;
use digest::Mac;
use generic_array::{typenum::U16, GenericArray};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::Error;
use crate::gf128;

type CmacAes128 = Cmac<Aes128>;
type CtrAes128 = ctr::Ctr128BE<Aes128>;

/// Sticky tri-state result of the single crypto operation a [`SivCtx`] is
/// allowed to perform, read back via [`SivCtx::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalResult {
    /// No `encrypt`/`decrypt` has completed yet.
    Undecided,
    /// The operation completed and (for decrypt) the tag verified.
    Succeeded,
    /// The operation completed but (for decrypt) the tag did not verify.
    Failed,
}

/// An AES-SIV-128 context: key material, the running S2V accumulator, and
/// the one-shot state machine around a single encrypt/decrypt call.
pub struct SivCtx {
    /// Running S2V accumulator `D`.
    d: [u8; 16],
    /// Computed or caller-supplied authentication tag / synthetic IV.
    tag: [u8; 16],
    /// CMAC keyed with K1, duplicated per S2V stage.
    cmac_template: CmacAes128,
    /// K2, used to key a fresh CTR instance per crypto operation.
    ctr_key: GenericArray<u8, U16>,
    final_ret: FinalResult,
    /// `true` once the one-shot encrypt/decrypt budget has been spent.
    spent: bool,
}

impl SivCtx {
    /// `new(key, K_cbc_cipher, K_ctr_cipher)`: build a context from a
    /// 32-byte key (`K1 || K2`, each half an AES-128 key).
    pub fn new(key: &[u8]) -> Result<Self, Error> {
        // AES-SIV-128 specifically: both halves are 128-bit AES keys, so
        // the combined key is fixed at 32 bytes (see Non-goals: wider key
        // sizes are out of scope for this crate).
        if key.len() != 32 {
            return Err(Error::InvalidArgument);
        }
        let (k1, k2) = key.split_at(16);

        let cmac_template =
            <CmacAes128 as KeyInit>::new_from_slice(k1).map_err(|_| Error::UnderlyingCipherFailure)?;
        let ctr_key = *GenericArray::from_slice(k2);

        let mut ctx = Self {
            d: [0u8; 16],
            tag: [0u8; 16],
            cmac_template,
            ctr_key,
            final_ret: FinalResult::Undecided,
            spent: false,
        };
        ctx.reset_d();
        Ok(ctx)
    }

    /// `init(ctx, key, ...)`: reinitialize an existing context in place,
    /// as if it had just been constructed with [`Self::new`].
    pub fn init(&mut self, key: &[u8]) -> Result<(), Error> {
        *self = Self::new(key)?;
        Ok(())
    }

    /// `copy(dst, src)`: clone another context's full state into `self`.
    pub fn copy_from(&mut self, src: &Self) {
        self.d = src.d;
        self.tag = src.tag;
        self.cmac_template = src.cmac_template.clone();
        self.ctr_key = src.ctr_key;
        self.final_ret = src.final_ret;
        self.spent = src.spent;
    }

    fn reset_d(&mut self) {
        let mut mac = self.cmac_template.clone();
        Mac::update(&mut mac, &[0u8; 16]);
        self.d.copy_from_slice(&mac.finalize().into_bytes());
    }

    /// `aad(ctx, bytes)`: absorb one associated-data segment. Per RFC 5297
    /// the nonce is simply the last AAD segment; this mode does not
    /// distinguish it from any other segment. Fails once the one-shot
    /// crypto operation has already run.
    pub fn aad(&mut self, segment: &[u8]) -> Result<(), Error> {
        if self.spent {
            return Err(Error::StateViolation);
        }
        gf128::double(&mut self.d);
        let mut mac = self.cmac_template.clone();
        Mac::update(&mut mac, segment);
        let t = mac.finalize().into_bytes();
        for (d, t) in self.d.iter_mut().zip(t.iter()) {
            *d ^= t;
        }
        Ok(())
    }

    /// The S2V final-block mixing step (RFC 5297 section 2.4, steps for the
    /// last input): CMAC over the message, with the last 16 bytes (or the
    /// whole padded message, if shorter than a block) XORed against `D`.
    fn s2v_final(&self, m: &[u8]) -> [u8; 16] {
        let mut mac = self.cmac_template.clone();
        if m.len() >= 16 {
            let (head, tail) = m.split_at(m.len() - 16);
            Mac::update(&mut mac, head);
            let mut last = [0u8; 16];
            last.copy_from_slice(tail);
            for (l, d) in last.iter_mut().zip(self.d.iter()) {
                *l ^= d;
            }
            Mac::update(&mut mac, &last);
        } else {
            let mut padded = [0u8; 16];
            padded[..m.len()].copy_from_slice(m);
            padded[m.len()] = 0x80;
            let mut d2 = self.d;
            gf128::double(&mut d2);
            for (p, d) in padded.iter_mut().zip(d2.iter()) {
                *p ^= d;
            }
            Mac::update(&mut mac, &padded);
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    /// Clear the top bit of bytes 8 and 12 of the synthetic IV to derive the
    /// CTR starting counter block (RFC 5297 section 2.6).
    fn ctr_start_block(tag: &[u8; 16]) -> GenericArray<u8, U16> {
        let mut q = *tag;
        q[8] &= 0x7f;
        q[12] &= 0x7f;
        GenericArray::clone_from_slice(&q)
    }

    /// `encrypt(ctx, in, out) -> len`: the one allowed crypto operation.
    /// Computes the synthetic IV/tag over the accumulated AAD and
    /// `plaintext`, then encrypts `plaintext` under AES-CTR starting at the
    /// bit-cleared tag.
    pub fn encrypt(&mut self, plaintext: &[u8], out: &mut [u8]) -> Result<usize, Error> {
        if self.spent {
            return Err(Error::StateViolation);
        }
        if out.len() < plaintext.len() {
            return Err(Error::InvalidArgument);
        }
        self.spent = true;

        let q = self.s2v_final(plaintext);
        self.tag = q;

        out[..plaintext.len()].copy_from_slice(plaintext);
        let start = Self::ctr_start_block(&q);
        let mut cipher = CtrAes128::new(&self.ctr_key, &start);
        cipher.apply_keystream(&mut out[..plaintext.len()]);

        self.final_ret = FinalResult::Succeeded;
        Ok(plaintext.len())
    }

    /// `decrypt(ctx, in, out) -> len`: the one allowed crypto operation.
    /// Requires a tag to already be set via [`Self::set_tag`] (or inherited
    /// from a prior `encrypt` on this same context, e.g. after `copy_from`).
    /// Recovers the candidate plaintext, re-derives the tag over it, and
    /// compares in constant time; on mismatch, the output buffer is
    /// scrubbed and no valid plaintext is exposed.
    pub fn decrypt(&mut self, ciphertext: &[u8], out: &mut [u8]) -> Result<usize, Error> {
        if self.spent {
            return Err(Error::StateViolation);
        }
        if out.len() < ciphertext.len() {
            return Err(Error::InvalidArgument);
        }
        self.spent = true;

        let q = self.tag;
        out[..ciphertext.len()].copy_from_slice(ciphertext);
        let start = Self::ctr_start_block(&q);
        let mut cipher = CtrAes128::new(&self.ctr_key, &start);
        cipher.apply_keystream(&mut out[..ciphertext.len()]);

        let candidate_tag = self.s2v_final(&out[..ciphertext.len()]);
        if candidate_tag.ct_eq(&q).unwrap_u8() == 0 {
            out[..ciphertext.len()].zeroize();
            self.final_ret = FinalResult::Failed;
            return Err(Error::AuthenticationFailure);
        }

        self.final_ret = FinalResult::Succeeded;
        Ok(ciphertext.len())
    }

    /// `set_tag(ctx, bytes[16])`: supply the tag to verify against during
    /// a subsequent [`Self::decrypt`]. Must be exactly 16 bytes.
    pub fn set_tag(&mut self, tag: &[u8]) -> Result<(), Error> {
        if tag.len() != 16 {
            return Err(Error::InvalidArgument);
        }
        self.tag.copy_from_slice(tag);
        Ok(())
    }

    /// `get_tag(ctx, buf[16])`: copy out the current tag. Must be exactly
    /// 16 bytes.
    pub fn get_tag(&self, buf: &mut [u8]) -> Result<(), Error> {
        if buf.len() != 16 {
            return Err(Error::InvalidArgument);
        }
        buf.copy_from_slice(&self.tag);
        Ok(())
    }

    /// `finish(ctx) -> final_ret`: the sticky result of the last
    /// encrypt/decrypt.
    pub fn finish(&self) -> FinalResult {
        self.final_ret
    }

    /// `cleanup(ctx)`: scrub `D` and the tag. The context may not be reused
    /// without calling [`Self::init`] again.
    pub fn cleanup(&mut self) {
        self.d.zeroize();
        self.tag.zeroize();
    }
}

impl Drop for SivCtx {
    fn drop(&mut self) {
        self.d.zeroize();
        self.tag.zeroize();
        self.ctr_key.zeroize();
    }
}
