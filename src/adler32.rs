//! Adler-32 checksum (RFC 1950) used for zlib framing.

const MOD_ADLER: u32 = 65_521;
const NMAX: usize = 5552;

/// Calculate the Adler-32 checksum of `data`.
///
/// Defers modulo operations to chunk boundaries (NMAX = 5552, the most
/// bytes that can be summed before `s2` can overflow a `u32`).
#[inline]
pub fn adler32(data: &[u8]) -> u32 {
    adler32_update(1, data)
}

/// Fold `data` into a running Adler-32 state.
///
/// The initial state for an empty stream is 1; feeding a stream in chunks
/// through this function yields the same checksum as one [`adler32`] call
/// over the concatenation.
#[inline]
pub fn adler32_update(adler: u32, data: &[u8]) -> u32 {
    let mut s1 = adler & 0xFFFF;
    let mut s2 = adler >> 16;

    for chunk in data.chunks(NMAX) {
        for &b in chunk {
            s1 += b as u32;
            s2 += s1;
        }
        s1 %= MOD_ADLER;
        s2 %= MOD_ADLER;
    }

    (s2 << 16) | s1
}

#[cfg(test)]
mod tests {
    use super::{adler32, adler32_update};

    #[test]
    fn test_adler32_empty() {
        assert_eq!(adler32(&[]), 1);
    }

    #[test]
    fn test_adler32_known_values() {
        assert_eq!(adler32(b"hello"), 0x062C0215);
        assert_eq!(adler32(b"Adler-32"), 0x0C34027B);
        assert_eq!(adler32(b"123456789"), 0x091E01DE);
    }

    #[test]
    fn test_adler32_update_matches_one_shot() {
        let data: Vec<u8> = (0..20_000).map(|i| (i * 31 % 251) as u8).collect();
        let mut state = 1;
        for chunk in data.chunks(977) {
            state = adler32_update(state, chunk);
        }
        assert_eq!(state, adler32(&data));
    }
}
