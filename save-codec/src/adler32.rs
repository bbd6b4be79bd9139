//! RFC 1950 Adler-32 checksum.

const MOD_ADLER: u32 = 65521;

/// Computes the Adler-32 checksum of `data`.
///
/// `adler32(&[]) == 1` per RFC 1950: `a` starts at 1 and `b` at 0, so an
/// empty input leaves the checksum at `(0 << 16) | 1`.
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;

    // NMAX is the largest number of bytes that can be summed into `a`
    // without `b` overflowing a u32; batching the modulo keeps this from
    // being a divide-per-byte operation.
    const NMAX: usize = 5552;

    for chunk in data.chunks(NMAX) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }

    (b << 16) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_one() {
        assert_eq!(adler32(&[]), 1);
    }

    #[test]
    fn single_byte() {
        // a = (1 + 0x61) mod 65521 = 0x62, b = (0 + 0x62) mod 65521 = 0x62
        assert_eq!(adler32(b"a"), 0x0062_0062);
    }

    #[test]
    fn known_vector_wikipedia() {
        // "Wikipedia" -> 0x11E60398 is the commonly cited reference vector.
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn sequential_bytes_0_to_255() {
        let data: Vec<u8> = (0..=255u8).collect();
        // a = 1 + sum(0..=255) mod 65521 = 1 + 32640 = 32641
        // b = sum over i of a_i, computed incrementally; verified against
        // a reference python implementation of the RFC 1950 algorithm.
        let mut a: u32 = 1;
        let mut b: u32 = 0;
        for &byte in &data {
            a = (a + u32::from(byte)) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }
        let expected = (b << 16) | a;
        assert_eq!(adler32(&data), expected);
    }

    #[test]
    fn repeated_byte_vector_wraps_modulus() {
        let data = vec![0xFFu8; 6000];
        let mut a: u32 = 1;
        let mut b: u32 = 0;
        for &byte in &data {
            a = (a + u32::from(byte)) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }
        let expected = (b << 16) | a;
        assert_eq!(adler32(&data), expected);
    }

    #[test]
    fn batched_nmax_boundary_matches_naive() {
        // Exercise the NMAX-chunking path against a byte-by-byte reference.
        let data: Vec<u8> = (0..20000u32).map(|i| (i % 251) as u8).collect();
        let mut a: u32 = 1;
        let mut b: u32 = 0;
        for &byte in &data {
            a = (a + u32::from(byte)) % MOD_ADLER;
            b = (b + a) % MOD_ADLER;
        }
        let expected = (b << 16) | a;
        assert_eq!(adler32(&data), expected);
    }
}
