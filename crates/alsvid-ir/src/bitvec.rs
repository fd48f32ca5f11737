//! Fixed-length classical bit strings.
//!
//! A [`BitVector`] is both a circuit input pattern and a sampled measurement
//! outcome. Bit `i` corresponds to qubit `i` and to bit `i` of a
//! computational-basis index (little-endian: bit 0 is the least significant
//! index bit). `Display` prints bit 0 first, matching the common
//! qubit-0-leftmost convention for measurement outcomes.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{IrError, IrResult};

/// An ordered, fixed-length sequence of classical bits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BitVector {
    bits: Vec<bool>,
}

impl BitVector {
    /// Create an all-zero bit vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// Build a bit vector of length `len` from a basis-state index.
    ///
    /// Bit `i` of `index` becomes bit `i` of the result.
    pub fn from_index(index: usize, len: usize) -> Self {
        let bits = (0..len).map(|i| (index >> i) & 1 == 1).collect();
        Self { bits }
    }

    /// Build from an explicit bit slice.
    pub fn from_bits(bits: impl Into<Vec<bool>>) -> Self {
        Self { bits: bits.into() }
    }

    /// The basis-state index this bit pattern addresses.
    ///
    /// Only meaningful for lengths that fit in a `usize` index; callers
    /// validate the resulting index against their amplitude array.
    pub fn to_index(&self) -> usize {
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .fold(0usize, |acc, (i, _)| acc | (1 << i))
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when the vector holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Read bit `i`, if in range.
    pub fn get(&self, i: usize) -> Option<bool> {
        self.bits.get(i).copied()
    }

    /// Iterate over the bits, bit 0 first.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

impl FromStr for BitVector {
    type Err = IrError;

    fn from_str(s: &str) -> IrResult<Self> {
        let mut bits = Vec::with_capacity(s.len());
        for (position, ch) in s.chars().enumerate() {
            match ch {
                '0' => bits.push(false),
                '1' => bits.push(true),
                found => return Err(IrError::InvalidBitString { found, position }),
            }
        }
        Ok(Self { bits })
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            write!(f, "{}", if b { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl Serialize for BitVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BitVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let bv = BitVector::zeros(4);
        assert_eq!(bv.len(), 4);
        assert_eq!(bv.to_string(), "0000");
        assert_eq!(bv.to_index(), 0);
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        let bv: BitVector = "0110".parse().unwrap();
        assert_eq!(bv.to_string(), "0110");
        assert!(!bv.get(0).unwrap());
        assert!(bv.get(1).unwrap());
    }

    #[test]
    fn test_parse_rejects_non_binary() {
        let err = "01x1".parse::<BitVector>().unwrap_err();
        assert!(matches!(
            err,
            IrError::InvalidBitString {
                found: 'x',
                position: 2
            }
        ));
    }

    #[test]
    fn test_index_conversion() {
        // bit 0 is the least significant index bit
        let bv = BitVector::from_index(0b101, 3);
        assert_eq!(bv.to_string(), "101");
        assert_eq!(bv.to_index(), 0b101);

        let bv = BitVector::from_index(2, 3);
        assert_eq!(bv.to_string(), "010");
    }

    #[test]
    fn test_ordering_is_bit_exact() {
        let a: BitVector = "001".parse().unwrap();
        let b: BitVector = "010".parse().unwrap();
        assert!(a < b);
        assert_eq!(a, "001".parse().unwrap());
    }

    #[test]
    fn test_empty() {
        let bv = BitVector::zeros(0);
        assert!(bv.is_empty());
        assert_eq!(bv.to_string(), "");
        assert_eq!(bv.to_index(), 0);
    }

    proptest::proptest! {
        #[test]
        fn index_roundtrip(index in 0usize..1024, extra in 0usize..4) {
            let len = 10 + extra;
            let bv = BitVector::from_index(index, len);
            proptest::prop_assert_eq!(bv.to_index(), index);
            proptest::prop_assert_eq!(bv.len(), len);
        }

        #[test]
        fn display_parse_roundtrip(bits in proptest::collection::vec(proptest::bool::ANY, 0..16)) {
            let bv = BitVector::from_bits(bits);
            let parsed: BitVector = bv.to_string().parse().unwrap();
            proptest::prop_assert_eq!(parsed, bv);
        }
    }
}
