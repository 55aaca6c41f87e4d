//! Length-prefixing and block-padding helpers from
//! [NIST SP 800-185](https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-185.pdf):
//! `left_encode`, `right_encode`, `encode_string`, and `bytepad`.
//!
//! These are pure functions over byte buffers; they hold no state and know
//! nothing about Keccak. The KMAC context (`crate::kmac`) is the only caller.

use alloc::vec::Vec;

use crate::error::Error;

/// Minimal big-endian encoding of `x`, at least one byte long.
fn minimal_be_bytes(x: u64) -> Vec<u8> {
    if x == 0 {
        return alloc::vec![0u8];
    }
    let full = x.to_be_bytes();
    let first_nonzero = full.iter().position(|&b| b != 0).unwrap();
    full[first_nonzero..].to_vec()
}

/// `left_encode(x)`: the byte length of the minimal encoding of `x`,
/// followed by that encoding itself.
pub fn left_encode(x: u64) -> Vec<u8> {
    let body = minimal_be_bytes(x);
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(body.len() as u8);
    out.extend_from_slice(&body);
    out
}

/// `right_encode(x)`: the minimal encoding of `x`, followed by its byte length.
pub fn right_encode(x: u64) -> Vec<u8> {
    let body = minimal_be_bytes(x);
    let mut out = Vec::with_capacity(body.len() + 1);
    out.extend_from_slice(&body);
    out.push(body.len() as u8);
    out
}

/// `encode_string(S)`: `left_encode(8 * |S|) || S`.
///
/// Fails if `|S|` in bits overflows a `u64` (`s.len()` beyond ~2^61 bytes),
/// which can only happen for inputs no real caller of this crate will ever
/// construct; callers additionally enforce the tighter SP 800-185 bounds
/// (KMAC key and customization string lengths) before reaching this helper.
pub fn encode_string(s: &[u8]) -> Result<Vec<u8>, Error> {
    let bit_len = (s.len() as u64)
        .checked_mul(8)
        .ok_or(Error::InvalidArgument)?;
    let mut out = left_encode(bit_len);
    out.extend_from_slice(s);
    Ok(out)
}

/// `bytepad(X, w)`: `left_encode(w) || X`, zero-padded up to a multiple of `w`.
pub fn bytepad(x: &[u8], w: usize) -> Vec<u8> {
    debug_assert!(w > 0);
    let mut out = left_encode(w as u64);
    out.extend_from_slice(x);
    let rem = out.len() % w;
    if rem != 0 {
        out.resize(out.len() + (w - rem), 0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn left_encode_zero() {
        assert_eq!(left_encode(0), alloc::vec![0x01, 0x00]);
    }

    #[test]
    fn left_encode_small() {
        // left_encode(168): one magnitude byte, value 0xA8.
        assert_eq!(left_encode(168), alloc::vec![0x01, 0xA8]);
    }

    #[test]
    fn left_encode_needs_two_bytes() {
        // left_encode(256) = 02 01 00 (256 = 0x0100, minimal is two bytes).
        assert_eq!(left_encode(256), alloc::vec![0x02, 0x01, 0x00]);
    }

    #[test]
    fn right_encode_zero() {
        assert_eq!(right_encode(0), alloc::vec![0x00, 0x01]);
    }

    #[test]
    fn encode_string_kmac_constant() {
        // SP 800-185's worked example: encode_string("KMAC") is exactly
        // the six bytes 01 20 4B 4D 41 43.
        let encoded = encode_string(b"KMAC").unwrap();
        assert_eq!(encoded, alloc::vec![0x01, 0x20, 0x4B, 0x4D, 0x41, 0x43]);
    }

    #[test]
    fn bytepad_is_multiple_of_w_and_at_least_len_plus_2() {
        for w in [136usize, 168] {
            for len in [0usize, 1, 5, 64, 200] {
                let x = alloc::vec![0xABu8; len];
                let padded = bytepad(&x, w);
                assert_eq!(padded.len() % w, 0);
                assert!(padded.len() >= len + 2);
            }
        }
    }

    #[test]
    fn bytepad_prefix_and_tail() {
        let x = b"foo";
        let padded = bytepad(x, 8);
        // left_encode(8) = 01 08, then "foo", then zero pad to multiple of 8.
        assert_eq!(&padded[..2], &[0x01, 0x08]);
        assert_eq!(&padded[2..5], b"foo");
        assert_eq!(padded.len(), 8);
        assert!(padded[5..].iter().all(|&b| b == 0));
    }

    // `bytepad(X, w)`'s output is always a multiple of `w` and at least
    // `|X|+2` bytes, for arbitrary `X` and any nonzero `w` in a single byte.
    #[quickcheck]
    fn bytepad_multiple_of_w_prop(x: Vec<u8>, w_seed: u8) -> bool {
        let w = (w_seed as usize) + 1;
        let padded = bytepad(&x, w);
        padded.len() % w == 0 && padded.len() >= x.len() + 2
    }

    // `left_encode`/`right_encode` round-trip the same minimal-byte-count
    // rule regardless of which end the length prefix sits on.
    #[quickcheck]
    fn left_and_right_encode_share_a_body_prop(x: u64) -> bool {
        let left = left_encode(x);
        let right = right_encode(x);
        let n = left[0] as usize;
        left[1..].len() == n && right[..right.len() - 1].len() == n && left[1..] == right[..n]
    }
}
