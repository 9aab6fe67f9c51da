//! Monetary amounts in minor currency units.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use stockdesk_core::{DomainError, DomainResult};

/// A non-negative amount stored as minor units (paise, cents).
///
/// On the wire it is a plain JSON number in major units (`12.5`), rounded to
/// two decimals on the way in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest accepted amount in major units.
    pub const MAX_MAJOR: f64 = 1_000_000_000.0;

    pub fn from_minor(minor: i64) -> DomainResult<Self> {
        if minor < 0 {
            return Err(DomainError::validation("amount must not be negative"));
        }
        Ok(Self(minor))
    }

    pub fn from_major(major: f64) -> DomainResult<Self> {
        if !major.is_finite() {
            return Err(DomainError::validation("amount must be a finite number"));
        }
        if major < 0.0 {
            return Err(DomainError::validation("amount must not be negative"));
        }
        if major > Self::MAX_MAJOR {
            return Err(DomainError::validation("amount is too large"));
        }
        Ok(Self((major * 100.0).round() as i64))
    }

    pub fn minor(&self) -> i64 {
        self.0
    }

    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `self * qty`, or `None` on overflow or a negative quantity.
    pub fn checked_mul(self, qty: i64) -> Option<Money> {
        if qty < 0 {
            return None;
        }
        self.0.checked_mul(qty).map(Money)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        Money::from_major(major).map_err(de::Error::custom)
    }
}
