// 🗂️ Indexes - ZIP → rate areas, rate area → Silver plans
// Each index is owned by exactly one builder task until its channel closes,
// then handed back by value and only read from that point on.

use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::debug;

use crate::model::{Plan, RateArea, ZipCode, ZipRateLink};

// ============================================================================
// RATE AREA INDEX
// ============================================================================

/// RateAreaIndex - Every distinct rate area each ZIP belongs to
#[derive(Debug, Clone, Default)]
pub struct RateAreaIndex {
    areas: HashMap<ZipCode, HashSet<RateArea>>,
}

impl RateAreaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume links until the producer closes the channel
    pub async fn build(mut rx: mpsc::Receiver<ZipRateLink>) -> Self {
        let mut index = RateAreaIndex::new();
        let mut links = 0usize;

        while let Some(link) = rx.recv().await {
            index.insert(link);
            links += 1;
        }

        debug!(links, zips = index.len(), "rate area index frozen");
        index
    }

    pub fn insert(&mut self, link: ZipRateLink) {
        self.areas.entry(link.zip).or_default().insert(link.rate_area);
    }

    /// Rate areas for `zip`; empty for ZIPs we never saw
    pub fn rate_areas(&self, zip: &ZipCode) -> impl Iterator<Item = &RateArea> {
        self.areas.get(zip).into_iter().flatten()
    }

    /// Number of distinct rate areas for `zip`
    pub fn count(&self, zip: &ZipCode) -> usize {
        self.areas.get(zip).map_or(0, HashSet::len)
    }

    /// Number of distinct ZIPs indexed
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

impl FromIterator<ZipRateLink> for RateAreaIndex {
    fn from_iter<I: IntoIterator<Item = ZipRateLink>>(iter: I) -> Self {
        let mut index = RateAreaIndex::new();
        for link in iter {
            index.insert(link);
        }
        index
    }
}

// ============================================================================
// PLAN INDEX
// ============================================================================

/// PlanIndex - Silver plans per rate area, in arrival order
#[derive(Debug, Clone, Default)]
pub struct PlanIndex {
    plans: HashMap<RateArea, Vec<Plan>>,
}

impl PlanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume plans until the producer closes the channel
    pub async fn build(mut rx: mpsc::Receiver<Plan>) -> Self {
        let mut index = PlanIndex::new();
        let mut rejected = 0usize;

        while let Some(plan) = rx.recv().await {
            if !plan.metal_level.is_silver() {
                debug!(plan = %plan.plan_id, metal_level = plan.metal_level.name(), "rejecting non-Silver plan");
                rejected += 1;
                continue;
            }
            index.insert(plan);
        }

        debug!(rate_areas = index.len(), rejected, "plan index frozen");
        index
    }

    /// Append a plan. Anything that isn't Silver is dropped and `false` is returned.
    pub fn insert(&mut self, plan: Plan) -> bool {
        if !plan.metal_level.is_silver() {
            return false;
        }
        self.plans.entry(plan.rate_area.clone()).or_default().push(plan);
        true
    }

    /// Silver plans offered in `rate_area`, unsorted
    pub fn silver_plans(&self, rate_area: &RateArea) -> &[Plan] {
        self.plans.get(rate_area).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of rate areas with at least one Silver plan
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl FromIterator<Plan> for PlanIndex {
    fn from_iter<I: IntoIterator<Item = Plan>>(iter: I) -> Self {
        let mut index = PlanIndex::new();
        for plan in iter {
            index.insert(plan);
        }
        index
    }
}

// ============================================================================
// TESTS
// ============================================================================
