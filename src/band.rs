//------------ Band parameters and key construction ----------------------

use crate::error::LshForestError;

/// The fixed geometry of a banded signature: how wide each signature is,
/// how many bands it's cut into, and how wide each band is.
///
/// Band `i` covers signature indices `[i * band_width, (i + 1) * band_width)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BandParams {
    d: u32,
    l: u32,
    band_width: u32,
}

impl BandParams {
    pub fn new(d: u32, l: u32) -> Result<Self, LshForestError> {
        if d == 0 {
            return Err(LshForestError::InvalidParameter(
                "d must be greater than zero".into(),
            ));
        }
        if l == 0 {
            return Err(LshForestError::InvalidParameter(
                "l must be greater than zero".into(),
            ));
        }
        if l > d {
            return Err(LshForestError::InvalidParameter(format!(
                "l ({l}) must be less than or equal to d ({d})"
            )));
        }

        Ok(BandParams {
            d,
            l,
            band_width: d / l,
        })
    }

    pub fn d(&self) -> u32 {
        self.d
    }

    pub fn l(&self) -> u32 {
        self.l
    }

    /// `k_` in spec terms: the width of a single band.
    pub fn band_width(&self) -> u32 {
        self.band_width
    }

    /// The `[start, end)` signature-index range covered by band `i`.
    pub fn band_range(&self, band: u32) -> (usize, usize) {
        let start = (band * self.band_width) as usize;
        (start, start + self.band_width as usize)
    }
}

/// Serializes the first `prefix_len` words of `signature[band]` into the
/// big-endian byte key used for band hash tables and sorted prefix
/// indexes.
///
/// `to_be_bytes` already produces the platform-independent big-endian byte
/// sequence the source obtains by swapping a little-endian word, so
/// lexicographic comparison of the returned bytes is equivalent to
/// elementwise unsigned comparison of the source words, on every host
/// endianness.
pub fn band_key(
    params: &BandParams,
    signature: &[u32],
    band: u32,
    prefix_len: u32,
) -> Box<[u8]> {
    debug_assert!(prefix_len >= 1 && prefix_len <= params.band_width());

    let (start, _) = params.band_range(band);
    let mut key = Vec::with_capacity(prefix_len as usize * 4);
    for word in &signature[start..start + prefix_len as usize] {
        key.extend_from_slice(&word.to_be_bytes());
    }
    key.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_width_floors() {
        let p = BandParams::new(10, 3).unwrap();
        assert_eq!(p.band_width(), 3);
        assert_eq!(p.band_range(0), (0, 3));
        assert_eq!(p.band_range(2), (6, 9));
    }

    #[test]
    fn rejects_l_greater_than_d() {
        assert!(BandParams::new(4, 5).is_err());
    }

    #[test]
    fn rejects_zero_d_or_l() {
        assert!(BandParams::new(0, 1).is_err());
        assert!(BandParams::new(4, 0).is_err());
    }

    #[test]
    fn full_band_key_is_big_endian() {
        let p = BandParams::new(4, 2).unwrap();
        let sig = [1u32, 2, 3, 4];
        let key = band_key(&p, &sig, 0, 2);
        assert_eq!(&*key, &[0, 0, 0, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn prefix_key_is_a_prefix_of_full_key() {
        let p = BandParams::new(4, 1).unwrap();
        let sig = [0x01020304u32, 0x05060708, 0, 0];
        let full = band_key(&p, &sig, 0, 4);
        let prefix = band_key(&p, &sig, 0, 2);
        assert_eq!(&full[..8], &*prefix);
    }

    #[test]
    fn lexicographic_order_matches_numeric_order() {
        let p = BandParams::new(2, 1).unwrap();
        let small = band_key(&p, &[1, 0], 0, 2);
        let big = band_key(&p, &[2, 0], 0, 2);
        assert!(small < big);
    }
}
