// 🎯 Resolver - Second-lowest-cost Silver plan per target ZIP
// Joins the frozen indexes; every failure mode becomes a blank rate

use serde::Serialize;
use std::collections::BTreeMap;

use crate::index::{PlanIndex, RateAreaIndex};
use crate::loader::TargetList;
use crate::model::{Plan, Rate, RateArea, ZipCode};

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolution - Outcome for one target ZIP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one rate area with at least two Silver plans
    Resolved(Rate),

    /// ZIP not in the rate area table
    UnknownRateArea,

    /// ZIP spans several rate areas, SLCSP is undefined
    AmbiguousRateArea { areas: usize },

    /// The rate area has fewer than two Silver plans
    InsufficientPlans { area: RateArea, plans: usize },
}

impl Resolution {
    /// Rate to print, None means a blank field
    pub fn rate(&self) -> Option<&Rate> {
        match self {
            Resolution::Resolved(rate) => Some(rate),
            _ => None,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Resolution::Resolved(_) => Status::Resolved,
            Resolution::UnknownRateArea => Status::UnknownRateArea,
            Resolution::AmbiguousRateArea { .. } => Status::AmbiguousRateArea,
            Resolution::InsufficientPlans { .. } => Status::InsufficientPlans,
        }
    }
}

/// Status - Resolution without its payload, for counting and JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Resolved,
    UnknownRateArea,
    AmbiguousRateArea,
    InsufficientPlans,
}

impl Status {
    pub fn code(&self) -> &'static str {
        match self {
            Status::Resolved => "resolved",
            Status::UnknownRateArea => "unknown_rate_area",
            Status::AmbiguousRateArea => "ambiguous_rate_area",
            Status::InsufficientPlans => "insufficient_plans",
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// One output row: the target ZIP and what we found for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRow {
    pub zip: ZipCode,
    pub resolution: Resolution,
}

impl ResolvedRow {
    pub fn rate(&self) -> Option<&str> {
        self.resolution.rate().map(Rate::as_str)
    }
}

/// Report - Resolved rows, in target list order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub rows: Vec<ResolvedRow>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// How many rows ended up in each status
    pub fn summary(&self) -> BTreeMap<Status, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.resolution.status()).or_insert(0) += 1;
        }
        counts
    }

    /// Lookup by ZIP (first row for that ZIP)
    pub fn get(&self, zip: &str) -> Option<&ResolvedRow> {
        self.rows.iter().find(|row| row.zip.as_str() == zip)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolver - Sole reader of the frozen indexes
pub struct Resolver {
    rate_areas: RateAreaIndex,
    plans: PlanIndex,
}

impl Resolver {
    pub fn new(rate_areas: RateAreaIndex, plans: PlanIndex) -> Self {
        Resolver { rate_areas, plans }
    }

    /// Resolve a single ZIP
    pub fn resolve_zip(&self, zip: &ZipCode) -> Resolution {
        let mut areas = self.rate_areas.rate_areas(zip);

        let area = match (areas.next(), areas.next()) {
            (None, _) => return Resolution::UnknownRateArea,
            (Some(area), None) => area,
            (Some(_), Some(_)) => {
                return Resolution::AmbiguousRateArea {
                    areas: self.rate_areas.count(zip),
                }
            }
        };

        let plans = self.plans.silver_plans(area);
        match second_lowest_rate(plans) {
            Some(rate) => Resolution::Resolved(rate.clone()),
            None => Resolution::InsufficientPlans {
                area: area.clone(),
                plans: plans.len(),
            },
        }
    }

    /// One row per target row, duplicates included, in target order
    pub fn resolve(&self, targets: &TargetList) -> Report {
        let rows = targets
            .iter()
            .map(|zip| ResolvedRow {
                zip: zip.clone(),
                resolution: self.resolve_zip(zip),
            })
            .collect();

        Report { rows }
    }
}

/// Rate of the second element after a stable ascending sort by numeric rate.
/// Equal rates count separately, so two plans at 212.35 give 212.35.
pub fn second_lowest_rate(plans: &[Plan]) -> Option<&Rate> {
    if plans.len() < 2 {
        return None;
    }

    let mut rates: Vec<&Rate> = plans.iter().map(|p| &p.rate).collect();
    rates.sort();
    rates.get(1).copied()
}

// ============================================================================
// TESTS
// ============================================================================
