//! KMAC128 / KMAC256 ([NIST SP 800-185](https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-185.pdf)):
//! a keyed message-authentication code and extendable-output function built
//! on a cSHAKE sponge.
//!
//! ```text
//! caller -> new(variant) -> set_params(key, custom?, outlen?, xof?) -> init
//!        -> update(msg)*  -> finalize(buf) -> digest
//! ```
//!
//! The sponge itself — Keccak-f[1600], its absorb/squeeze bookkeeping, and
//! the cSHAKE domain-separation padding, including the `N = "KMAC"`
//! function-name prefix that distinguishes KMAC from a bare cSHAKE call —
//! is an external collaborator, provided by [`sha3::CShake128`] /
//! [`sha3::CShake256`]. What belongs to this module is the KMAC-specific
//! layer SP 800-185 builds on top of cSHAKE: encoding and absorbing the key
//! (`bytepad(encode_string(K), w)`), and absorbing the trailing output
//! length encoding before squeezing.

use alloc::vec::Vec;

use digest::core_api::CoreWrapper;
use digest::{ExtendableOutput, Update, XofReader};
use sha3::{CShake128, CShake128Core, CShake256, CShake256Core};

use crate::encoding::{bytepad, encode_string, right_encode};
use crate::error::Error;

/// KMAC minimum key length in bytes. Not mandated by SP 800-185 itself; this
/// mirrors a local policy in the source implementation, preserved here for
/// compatibility (see `DESIGN.md`).
const MIN_KEY_LEN: usize = 4;
/// KMAC maximum key length in bytes.
const MAX_KEY_LEN: usize = 255;
/// Maximum customization string length in bytes.
const MAX_CUSTOM_LEN: usize = 127;

/// `N = "KMAC"`, the cSHAKE function-name parameter that turns a generic
/// cSHAKE call into KMAC (SP 800-185 section 4).
const FUNCTION_NAME: &[u8] = b"KMAC";

/// Which Keccak capacity (and therefore sponge rate) this context uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmacVariant {
    /// 256-bit capacity, 168-byte rate, 32-byte natural digest.
    Kmac128,
    /// 512-bit capacity, 136-byte rate, 64-byte natural digest.
    Kmac256,
}

impl KmacVariant {
    fn rate(self) -> usize {
        match self {
            KmacVariant::Kmac128 => 168,
            KmacVariant::Kmac256 => 136,
        }
    }

    fn default_out_len(self) -> usize {
        match self {
            KmacVariant::Kmac128 => 32,
            KmacVariant::Kmac256 => 64,
        }
    }
}

/// The live cSHAKE sponge, once `init` has absorbed the KMAC prefix and key.
/// Split by variant because `CShake128`/`CShake256` are distinct types.
#[derive(Clone)]
enum Sponge {
    Kmac128(CShake128),
    Kmac256(CShake256),
}

impl Sponge {
    fn update(&mut self, data: &[u8]) {
        match self {
            Sponge::Kmac128(s) => Update::update(s, data),
            Sponge::Kmac256(s) => Update::update(s, data),
        }
    }

    fn finalize_into(self, buf: &mut [u8]) {
        match self {
            Sponge::Kmac128(s) => ExtendableOutput::finalize_xof(s).read(buf),
            Sponge::Kmac256(s) => ExtendableOutput::finalize_xof(s).read(buf),
        }
    }
}

/// A KMAC128 or KMAC256 context.
///
/// Lifecycle: `new*` -> `set_key`/`set_custom`/`set_out_len`/`set_xof`
/// (any number of times, key/custom only take effect if set before `init`)
/// -> `init` -> `update*` -> `finalize`.
pub struct KmacCtx {
    variant: KmacVariant,
    sponge: Option<Sponge>,
    encoded_key: Option<Vec<u8>>,
    custom: Vec<u8>,
    out_len: usize,
    xof_mode: bool,
}

/// Bundle of parameters accepted by [`KmacCtx::set_params`], mirroring the
/// `set_params(ctx, {xof, outlen, key, custom})` external operation.
#[derive(Default)]
pub struct KmacParams<'a> {
    pub key: Option<&'a [u8]>,
    pub custom: Option<&'a [u8]>,
    pub out_len: Option<usize>,
    pub xof: Option<bool>,
}

impl KmacCtx {
    fn new(variant: KmacVariant) -> Self {
        Self {
            variant,
            sponge: None,
            encoded_key: None,
            custom: Vec::new(),
            out_len: variant.default_out_len(),
            xof_mode: false,
        }
    }

    /// `new128(provctx)`: a fresh KMAC128 context.
    pub fn new128() -> Self {
        Self::new(KmacVariant::Kmac128)
    }

    /// `new256(provctx)`: a fresh KMAC256 context.
    pub fn new256() -> Self {
        Self::new(KmacVariant::Kmac256)
    }

    /// Deep-copy of absorbed state, encoded key/custom, `out_len`, and
    /// `xof_mode`. The copy evolves independently of the original.
    pub fn duplicate(&self) -> Self {
        Self {
            variant: self.variant,
            sponge: self.sponge.clone(),
            encoded_key: self.encoded_key.clone(),
            custom: self.custom.clone(),
            out_len: self.out_len,
            xof_mode: self.xof_mode,
        }
    }

    /// Set the KMAC key. Must be 4 to 255 bytes. Has no effect if called
    /// after [`Self::init`].
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        if key.len() < MIN_KEY_LEN || key.len() > MAX_KEY_LEN {
            return Err(Error::InvalidArgument);
        }
        let rate = self.variant.rate();
        self.encoded_key = Some(bytepad(&encode_string(key)?, rate));
        Ok(())
    }

    /// Set the customization string. Must be at most 127 bytes. Has no
    /// effect if called after [`Self::init`].
    pub fn set_custom(&mut self, custom: &[u8]) -> Result<(), Error> {
        if custom.len() > MAX_CUSTOM_LEN {
            return Err(Error::InvalidArgument);
        }
        self.custom = custom.to_vec();
        Ok(())
    }

    /// Set the requested output length in bytes. May be changed any time
    /// before [`Self::finalize`].
    pub fn set_out_len(&mut self, out_len: usize) -> Result<(), Error> {
        if out_len == 0 {
            return Err(Error::InvalidArgument);
        }
        self.out_len = out_len;
        Ok(())
    }

    /// Toggle XOF mode. In XOF mode, finalization encodes a length of `0`
    /// instead of `out_len * 8`, per SP 800-185's KMACXOF construction. May
    /// be changed any time before [`Self::finalize`].
    pub fn set_xof(&mut self, xof: bool) {
        self.xof_mode = xof;
    }

    /// `get_params(ctx, {outlen|size|digestsize})`.
    pub fn out_len(&self) -> usize {
        self.out_len
    }

    /// Apply a full parameter bundle at once.
    pub fn set_params(&mut self, params: KmacParams<'_>) -> Result<(), Error> {
        if let Some(key) = params.key {
            self.set_key(key)?;
        }
        if let Some(custom) = params.custom {
            self.set_custom(custom)?;
        }
        if let Some(out_len) = params.out_len {
            self.set_out_len(out_len)?;
        }
        if let Some(xof) = params.xof {
            self.set_xof(xof);
        }
        Ok(())
    }

    /// Begin absorbing. Fails with [`Error::StateViolation`] if no key has
    /// been set. Constructing the cSHAKE sponge with `N = "KMAC"` and the
    /// customization string already absorbs SP 800-185's required prefix;
    /// this only absorbs the encoded key on top of that.
    pub fn init(&mut self) -> Result<(), Error> {
        let encoded_key = self.encoded_key.as_ref().ok_or(Error::StateViolation)?;

        let mut sponge = match self.variant {
            KmacVariant::Kmac128 => Sponge::Kmac128(CoreWrapper::from_core(
                CShake128Core::new_with_function_name(FUNCTION_NAME, &self.custom),
            )),
            KmacVariant::Kmac256 => Sponge::Kmac256(CoreWrapper::from_core(
                CShake256Core::new_with_function_name(FUNCTION_NAME, &self.custom),
            )),
        };
        sponge.update(encoded_key);
        self.sponge = Some(sponge);
        Ok(())
    }

    /// Absorb message bytes. May be called any number of times after `init`.
    pub fn update(&mut self, data: &[u8]) -> Result<(), Error> {
        let sponge = self.sponge.as_mut().ok_or(Error::StateViolation)?;
        sponge.update(data);
        Ok(())
    }

    /// Absorb the trailing length encoding and squeeze `out_len` bytes into
    /// `buf`. Returns the number of bytes written. Consumes the absorb
    /// state; a further `update`/`finalize` call fails.
    pub fn finalize(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut sponge = self.sponge.take().ok_or(Error::StateViolation)?;
        if buf.len() < self.out_len {
            return Err(Error::InvalidArgument);
        }

        let length_bits = if self.xof_mode {
            0
        } else {
            (self.out_len as u64)
                .checked_mul(8)
                .ok_or(Error::InvalidArgument)?
        };
        sponge.update(&right_encode(length_bits));
        sponge.finalize_into(&mut buf[..self.out_len]);
        Ok(self.out_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn kmac(
        variant: KmacVariant,
        key: &[u8],
        data: &[u8],
        custom: &[u8],
        out_len: usize,
        xof: bool,
    ) -> Vec<u8> {
        let mut ctx = KmacCtx::new(variant);
        ctx.set_key(key).unwrap();
        ctx.set_custom(custom).unwrap();
        ctx.set_out_len(out_len).unwrap();
        ctx.set_xof(xof);
        ctx.init().unwrap();
        ctx.update(data).unwrap();
        let mut out = alloc::vec![0u8; out_len];
        ctx.finalize(&mut out).unwrap();
        out
    }

    // NIST SP 800-185 Appendix A, sample #1: KMAC128(key, "\x00\x01\x02\x03", 256, "").
    #[test]
    fn kmac128_sample_1() {
        let key: Vec<u8> = (0x40u8..=0x5F).collect();
        let data = [0x00u8, 0x01, 0x02, 0x03];
        let out = kmac(KmacVariant::Kmac128, &key, &data, b"", 32, false);
        let expected = hex_literal::hex!(
            "E5780B0D3EA6F7D3A429C5706AA43A00FADBD7D49628839E3187243F456EE14"
        );
        assert_eq!(out, expected);
    }

    // NIST SP 800-185 Appendix A, sample #3: KMAC128 over 200 bytes of data
    // with a non-empty customization string.
    #[test]
    fn kmac128_sample_with_custom() {
        let key: Vec<u8> = (0x40u8..=0x5F).collect();
        let data: Vec<u8> = (0x00u8..=0xC7).collect();
        let out = kmac(
            KmacVariant::Kmac128,
            &key,
            &data,
            b"My Tagged Application",
            32,
            false,
        );
        let expected = hex_literal::hex!(
            "3B1FBA963CD8B0B59E8C1A6D71888B7143651AF8BA0A7070C0979E2811324AA"
        );
        assert_eq!(out, expected);
    }

    // NIST SP 800-185 Appendix A, sample #4: KMAC256(key, "\x00\x01\x02\x03", 512, "").
    #[test]
    fn kmac256_sample_1() {
        let key: Vec<u8> = (0x40u8..=0x5F).collect();
        let data = [0x00u8, 0x01, 0x02, 0x03];
        let out = kmac(KmacVariant::Kmac256, &key, &data, b"", 64, false);
        let expected = hex_literal::hex!(
            "75358CF39E41494E949707927CEE0AF20A3FF553904C86B08F21CC414BCFD6"
            "91589D27CF5E15369CBBFF8B9A4C2EB17800855D0235FF635DA82533EC6B759B4"
        );
        assert_eq!(out, expected);
    }

    // NIST SP 800-185 Appendix A, sample #5: KMAC256 with a customization string.
    #[test]
    fn kmac256_sample_with_custom() {
        let key: Vec<u8> = (0x40u8..=0x5F).collect();
        let data = [0x00u8, 0x01, 0x02, 0x03];
        let out = kmac(
            KmacVariant::Kmac256,
            &key,
            &data,
            b"My Tagged Application",
            64,
            false,
        );
        let expected = hex_literal::hex!(
            "B58618F71F92E1D56C1B8C55DDD7CD188B97B4CA4D99831EB2699A837DA2E4D"
            "970FBACFDE50033AEA585F1A2708510C32D07880801BD182898FE476876FC8965"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn xof_and_non_xof_diverge_for_nonempty_input() {
        let key: Vec<u8> = (0x40u8..=0x5F).collect();
        let data = [0x00u8, 0x01, 0x02, 0x03];
        let fixed = kmac(KmacVariant::Kmac128, &key, &data, b"", 32, false);
        let xof = kmac(KmacVariant::Kmac128, &key, &data, b"", 32, true);
        assert_ne!(fixed, xof);
    }

    #[test]
    fn kmac256_xof_and_non_xof_diverge_for_nonempty_input() {
        let key: Vec<u8> = (0x40u8..=0x5F).collect();
        let data = [0x00u8, 0x01, 0x02, 0x03];
        let fixed = kmac(KmacVariant::Kmac256, &key, &data, b"", 64, false);
        let xof = kmac(KmacVariant::Kmac256, &key, &data, b"", 64, true);
        assert_ne!(fixed, xof);
    }

    #[test]
    fn init_without_key_is_a_state_violation() {
        let mut ctx = KmacCtx::new128();
        assert_eq!(ctx.init().unwrap_err(), Error::StateViolation);
    }

    #[test]
    fn key_length_bounds_are_enforced() {
        let mut ctx = KmacCtx::new128();
        assert_eq!(ctx.set_key(&[0u8; 3]).unwrap_err(), Error::InvalidArgument);
        assert_eq!(
            ctx.set_key(&[0u8; 256]).unwrap_err(),
            Error::InvalidArgument
        );
        assert!(ctx.set_key(&[0u8; 4]).is_ok());
        assert!(ctx.set_key(&[0u8; 255]).is_ok());
    }

    #[test]
    fn custom_length_bound_is_enforced() {
        let mut ctx = KmacCtx::new128();
        assert!(ctx.set_custom(&[0u8; 127]).is_ok());
        assert_eq!(
            ctx.set_custom(&[0u8; 128]).unwrap_err(),
            Error::InvalidArgument
        );
    }

    #[test]
    fn duplicate_forks_independent_state() {
        let mut ctx = KmacCtx::new128();
        ctx.set_key(b"0123456789abcdef").unwrap();
        ctx.init().unwrap();
        ctx.update(b"shared prefix").unwrap();

        let mut fork = ctx.duplicate();
        ctx.update(b" original tail").unwrap();
        fork.update(b" fork tail").unwrap();

        let mut out_orig = [0u8; 32];
        let mut out_fork = [0u8; 32];
        ctx.finalize(&mut out_orig).unwrap();
        fork.finalize(&mut out_fork).unwrap();
        assert_ne!(out_orig, out_fork);
    }

    #[test]
    fn finalize_rejects_undersized_buffer() {
        let mut ctx = KmacCtx::new128();
        ctx.set_key(b"0123456789abcdef").unwrap();
        ctx.set_out_len(32).unwrap();
        ctx.init().unwrap();
        let mut small = [0u8; 16];
        assert_eq!(
            ctx.finalize(&mut small).unwrap_err(),
            Error::InvalidArgument
        );
    }

    // A KMAC digest is a pure function of its inputs: two runs over the
    // same (key, custom, data, out_len) must always agree.
    #[quickcheck]
    fn kmac128_is_deterministic(key_tail: Vec<u8>, data: Vec<u8>, custom_seed: u8) -> bool {
        let mut key = alloc::vec![0u8; 16];
        key.extend(key_tail.into_iter().take(239));
        let custom = [custom_seed; 1];
        let a = kmac(KmacVariant::Kmac128, &key, &data, &custom, 32, false);
        let b = kmac(KmacVariant::Kmac128, &key, &data, &custom, 32, false);
        a == b
    }
}
