//! AttributeKey / AttributeMask - position attribute identifiers
//!
//! Wire codes follow the positioning API (`0x20` latitude, `0x21` longitude,
//! `0x22` altitude, `0x31` speed). Mask bits follow the change bitmask carried
//! by position update notifications.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign, RangeInclusive};
use std::str::FromStr;

use crate::ContractError;

/// A measured value, typed by its [`AttributeKey`].
pub type AttributeValue = f64;

/// Position attribute identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKey {
    /// Latitude (degrees)
    Latitude,
    /// Longitude (degrees)
    Longitude,
    /// Altitude above mean sea level (meters)
    Altitude,
    /// Horizontal speed (meters/second)
    Speed,
}

impl AttributeKey {
    /// Number of defined keys
    pub const COUNT: usize = 4;

    /// All keys in declaration order
    pub const ALL: [AttributeKey; Self::COUNT] = [
        AttributeKey::Latitude,
        AttributeKey::Longitude,
        AttributeKey::Altitude,
        AttributeKey::Speed,
    ];

    /// Stable 16-bit wire code
    pub const fn wire_code(self) -> u16 {
        match self {
            Self::Latitude => 0x20,
            Self::Longitude => 0x21,
            Self::Altitude => 0x22,
            Self::Speed => 0x31,
        }
    }

    /// Look up a key by wire code; unknown codes yield `None`
    pub fn from_wire_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.wire_code() == code)
    }

    /// Bit of this key in an [`AttributeMask`]
    pub const fn mask_bit(self) -> u64 {
        match self {
            Self::Latitude => 0x01,
            Self::Longitude => 0x02,
            Self::Altitude => 0x04,
            Self::Speed => 0x10,
        }
    }

    /// Dense index, usable for fixed-size per-key storage
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Physical bounds of a valid value (inclusive)
    pub fn valid_range(self) -> RangeInclusive<f64> {
        match self {
            Self::Latitude => -90.0..=90.0,
            Self::Longitude => -180.0..=180.0,
            Self::Altitude => -1000.0..=9000.0,
            Self::Speed => 0.0..=500.0,
        }
    }

    /// Whether `value` lies inside [`valid_range`](Self::valid_range). NaN never does.
    pub fn in_range(self, value: AttributeValue) -> bool {
        self.valid_range().contains(&value)
    }

    /// Unit symbol, for display
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Latitude | Self::Longitude => "deg",
            Self::Altitude => "m",
            Self::Speed => "m/s",
        }
    }

    /// Lowercase name, as used in configuration and output
    pub const fn name(self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::Altitude => "altitude",
            Self::Speed => "speed",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeKey {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.name() == needle)
            .ok_or_else(|| ContractError::UnknownAttribute(s.to_string()))
    }
}

/// Bit-set over [`AttributeKey`]
///
/// Bits that do not belong to a defined key are dropped on construction
/// from raw wire bits, so producers may announce attributes this consumer
/// does not know yet.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMask(u64);

impl AttributeMask {
    /// No attributes
    pub const EMPTY: Self = Self(0);

    /// Every defined attribute
    pub const ALL: Self = Self(
        AttributeKey::Latitude.mask_bit()
            | AttributeKey::Longitude.mask_bit()
            | AttributeKey::Altitude.mask_bit()
            | AttributeKey::Speed.mask_bit(),
    );

    /// Build from raw wire bits, ignoring unknown bits
    pub const fn from_bits_truncate(bits: u64) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Raw bits
    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn contains(self, key: AttributeKey) -> bool {
        self.0 & key.mask_bit() != 0
    }

    pub fn insert(&mut self, key: AttributeKey) {
        self.0 |= key.mask_bit();
    }

    pub fn remove(&mut self, key: AttributeKey) {
        self.0 &= !key.mask_bit();
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Keys in the mask, in [`AttributeKey::ALL`] order
    pub fn iter(self) -> impl Iterator<Item = AttributeKey> {
        AttributeKey::ALL
            .into_iter()
            .filter(move |key| self.contains(*key))
    }
}

impl From<AttributeKey> for AttributeMask {
    fn from(key: AttributeKey) -> Self {
        Self(key.mask_bit())
    }
}

impl FromIterator<AttributeKey> for AttributeMask {
    fn from_iter<I: IntoIterator<Item = AttributeKey>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for key in iter {
            mask.insert(key);
        }
        mask
    }
}

impl BitOr for AttributeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<AttributeKey> for AttributeMask {
    type Output = Self;

    fn bitor(self, rhs: AttributeKey) -> Self {
        Self(self.0 | rhs.mask_bit())
    }
}

impl BitOrAssign<AttributeKey> for AttributeMask {
    fn bitor_assign(&mut self, rhs: AttributeKey) {
        self.insert(rhs);
    }
}

impl fmt::Debug for AttributeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for AttributeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, key) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, "}}")
    }
}
