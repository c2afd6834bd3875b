//! Value objects: defined entirely by their attribute values.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

/// A monetary fine in whole rupees.
///
/// Forms historically submitted fines as strings, so the backend may echo
/// either `500` or `"500"`; both decode to the same value. Serialization always
/// emits a number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Fine(u64);

/// Severity band of a fine, used to colour rule listings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FineBand {
    /// Up to 500.
    Low,
    /// Up to 1000.
    Medium,
    /// Anything above 1000.
    High,
}

impl Fine {
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Adds two fines, pinning at `u64::MAX` instead of wrapping.
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn band(&self) -> FineBand {
        match self.0 {
            0..=500 => FineBand::Low,
            501..=1000 => FineBand::Medium,
            _ => FineBand::High,
        }
    }
}

impl core::fmt::Display for Fine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Rs. {}", self.0)
    }
}

impl core::iter::Sum for Fine {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::saturating_add)
    }
}

impl FromStr for Fine {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| DomainError::validation(format!("fine must be a whole number, got {s:?}")))
    }
}

impl<'de> Deserialize<'de> for Fine {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Float(f) if f.is_finite() && f >= 0.0 => Ok(Self(f.round() as u64)),
            Raw::Float(f) => Err(serde::de::Error::custom(format!("invalid fine {f}"))),
            Raw::Text(s) if s.trim().is_empty() => Ok(Self(0)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(Fine::new(0).band(), FineBand::Low);
        assert_eq!(Fine::new(500).band(), FineBand::Low);
        assert_eq!(Fine::new(501).band(), FineBand::Medium);
        assert_eq!(Fine::new(1000).band(), FineBand::Medium);
        assert_eq!(Fine::new(1001).band(), FineBand::High);
    }

    #[test]
    fn decodes_numbers_and_numeric_strings() {
        let a: Fine = serde_json::from_str("750").unwrap();
        let b: Fine = serde_json::from_str("\"750\"").unwrap();
        let c: Fine = serde_json::from_str("750.0").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(serde_json::to_string(&a).unwrap(), "750");
    }

    #[test]
    fn sums_saturate_instead_of_wrapping() {
        let huge = Fine::new(u64::MAX - 10);
        assert_eq!(huge.saturating_add(Fine::new(5)), Fine::new(u64::MAX - 5));
        assert_eq!([huge, Fine::new(11)].into_iter().sum::<Fine>(), Fine::new(u64::MAX));
        assert_eq!(core::iter::empty::<Fine>().sum::<Fine>(), Fine::default());
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(serde_json::from_str::<Fine>("\"a lot\"").is_err());
        assert!("-5".parse::<Fine>().is_err());
    }
}
