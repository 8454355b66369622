// 🗺️ Domain Model - ZIP codes, rate areas and plans
// Plain value types shared by the loaders, the indexes and the resolver

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ZIP CODE
// ============================================================================

/// ZipCode - Opaque identifier, only ever used as a lookup key
///
/// Never parsed as a number: "01001" must stay "01001".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZipCode(String);

impl ZipCode {
    pub fn new(zip: impl Into<String>) -> Self {
        ZipCode(zip.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZipCode {
    fn from(zip: &str) -> Self {
        ZipCode::new(zip)
    }
}

// ============================================================================
// RATE AREA
// ============================================================================

/// RateArea - Pricing region, identified by (state, area code)
///
/// Two rate areas are equal iff both fields match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RateArea {
    pub state: String,
    pub code: String,
}

impl RateArea {
    pub fn new(state: impl Into<String>, code: impl Into<String>) -> Self {
        RateArea {
            state: state.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for RateArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.state, self.code)
    }
}

/// ZipRateLink - One row of the ZIP → rate area mapping table
///
/// A ZIP may show up in several links (one per associated rate area).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipRateLink {
    pub zip: ZipCode,
    pub rate_area: RateArea,
}

impl ZipRateLink {
    pub fn new(zip: ZipCode, rate_area: RateArea) -> Self {
        ZipRateLink { zip, rate_area }
    }
}

// ============================================================================
// METAL LEVEL
// ============================================================================

/// MetalLevel - Plan tier label from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetalLevel {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Catastrophic,
    /// Anything the catalog uses that we don't know about
    Other(String),
}

impl MetalLevel {
    /// Parse the catalog label. Matching is exact, as written in the source data.
    pub fn parse(label: &str) -> Self {
        match label {
            "Bronze" => MetalLevel::Bronze,
            "Silver" => MetalLevel::Silver,
            "Gold" => MetalLevel::Gold,
            "Platinum" => MetalLevel::Platinum,
            "Catastrophic" => MetalLevel::Catastrophic,
            other => MetalLevel::Other(other.to_string()),
        }
    }

    pub fn is_silver(&self) -> bool {
        matches!(self, MetalLevel::Silver)
    }

    pub fn name(&self) -> &str {
        match self {
            MetalLevel::Bronze => "Bronze",
            MetalLevel::Silver => "Silver",
            MetalLevel::Gold => "Gold",
            MetalLevel::Platinum => "Platinum",
            MetalLevel::Catastrophic => "Catastrophic",
            MetalLevel::Other(label) => label,
        }
    }
}

// ============================================================================
// RATE
// ============================================================================

/// Rate - Monthly premium, kept exactly as written in the catalog
///
/// `value` drives ordering, `raw` is what gets printed. Equality and ordering
/// only look at the numeric value, so "228" == "228.00".
#[derive(Debug, Clone)]
pub struct Rate {
    raw: String,
    value: Decimal,
}

impl Rate {
    /// Surrounding whitespace is ignored for the numeric value only; `raw`
    /// keeps the field byte for byte.
    pub fn parse(raw: &str) -> Result<Self> {
        let value = Decimal::from_str(raw.trim())
            .with_context(|| format!("Invalid rate: {:?}", raw))?;

        Ok(Rate {
            raw: raw.to_string(),
            value,
        })
    }

    /// The rate string as it appeared in the source
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Rate {}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

// ============================================================================
// PLAN
// ============================================================================

/// Plan - One row of the plan catalog
#[derive(Debug, Clone)]
pub struct Plan {
    /// Carried for diagnostics only
    pub plan_id: String,
    pub metal_level: MetalLevel,
    pub rate: Rate,
    pub rate_area: RateArea,
}

impl Plan {
    pub fn new(plan_id: impl Into<String>, metal_level: MetalLevel, rate: Rate, rate_area: RateArea) -> Self {
        Plan {
            plan_id: plan_id.into(),
            metal_level,
            rate,
            rate_area,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_code_keeps_leading_zeros() {
        let zip = ZipCode::from("01001");
        assert_eq!(zip.as_str(), "01001");
        assert_eq!(zip.to_string(), "01001");
    }

    #[test]
    fn test_rate_area_equality_needs_both_fields() {
        assert_eq!(RateArea::new("MO", "3"), RateArea::new("MO", "3"));
        assert_ne!(RateArea::new("MO", "3"), RateArea::new("KS", "3"));
        assert_ne!(RateArea::new("MO", "3"), RateArea::new("MO", "30"));
    }

    #[test]
    fn test_metal_level_parse() {
        assert_eq!(MetalLevel::parse("Silver"), MetalLevel::Silver);
        assert_eq!(MetalLevel::parse("Gold"), MetalLevel::Gold);
        assert_eq!(MetalLevel::parse("silver"), MetalLevel::Other("silver".to_string()));
        assert!(MetalLevel::parse("Silver").is_silver());
        assert!(!MetalLevel::parse("Bronze").is_silver());
    }

    #[test]
    fn test_metal_level_name_round_trips_label() {
        for label in ["Bronze", "Silver", "Gold", "Platinum", "Catastrophic", "Expanded Bronze"] {
            assert_eq!(MetalLevel::parse(label).name(), label);
        }
    }

    #[test]
    fn test_rate_numeric_ordering() {
        let low = Rate::parse("99.50").unwrap();
        let high = Rate::parse("100.00").unwrap();

        assert!(low < high, "99.50 must sort before 100.00");
        assert!("99.50" > "100.00", "string order would get this wrong");
    }

    #[test]
    fn test_rate_keeps_original_text() {
        let rate = Rate::parse("245.2").unwrap();
        assert_eq!(rate.as_str(), "245.2");

        let padded = Rate::parse(" 245.20 ").unwrap();
        assert_eq!(padded.as_str(), " 245.20 ");
        assert_eq!(padded, rate);

        let whole = Rate::parse("228").unwrap();
        assert_eq!(whole.to_string(), "228");
        assert_eq!(whole, Rate::parse("228.00").unwrap());
    }

    #[test]
    fn test_rate_rejects_garbage() {
        assert!(Rate::parse("").is_err());
        assert!(Rate::parse("$245.20").is_err());
        assert!(Rate::parse("n/a").is_err());
    }
}
