// 📥 Loaders - Producers for the three input tables
// Each loader owns one source; index loaders push into an mpsc channel

use anyhow::Result;
use std::collections::HashMap;
use std::io::Read;
use tokio::sync::mpsc;

use crate::model::{MetalLevel, Plan, Rate, RateArea, ZipCode, ZipRateLink};
use crate::source::{drain, CsvSource, Parsed, ReadMode, SourceRow, SourceStats};

// Column layout of the input tables
const ZIP_COL_ZIP: usize = 0;
const ZIP_COL_STATE: usize = 1;
const ZIP_COL_RATE_AREA: usize = 4;

const PLAN_COL_ID: usize = 0;
const PLAN_COL_STATE: usize = 1;
const PLAN_COL_METAL: usize = 2;
const PLAN_COL_RATE: usize = 3;
const PLAN_COL_RATE_AREA: usize = 4;

const TARGET_COL_ZIP: usize = 0;

// ============================================================================
// ROW PARSERS
// ============================================================================

/// zips.csv row: zipcode,state,county_code,name,rate_area
pub fn parse_zip_link(row: &SourceRow) -> Result<Parsed<ZipRateLink>> {
    let zip = ZipCode::new(row.field(ZIP_COL_ZIP)?);
    let rate_area = RateArea::new(row.field(ZIP_COL_STATE)?, row.field(ZIP_COL_RATE_AREA)?);

    Ok(Parsed::Row(ZipRateLink::new(zip, rate_area)))
}

/// plans.csv row: plan_id,state,metal_level,rate,rate_area
///
/// Only Silver plans come out. Other tiers are consumed without looking at
/// their rate. A Silver row whose rate is not a decimal is `Invalid`.
pub fn parse_silver_plan(row: &SourceRow) -> Result<Parsed<Plan>> {
    let metal_level = MetalLevel::parse(row.field(PLAN_COL_METAL)?);
    if !metal_level.is_silver() {
        return Ok(Parsed::Filtered);
    }

    let raw_rate = row.field(PLAN_COL_RATE)?;
    let rate_area = RateArea::new(row.field(PLAN_COL_STATE)?, row.field(PLAN_COL_RATE_AREA)?);
    let plan_id = row.field(PLAN_COL_ID)?;

    let rate = match Rate::parse(raw_rate) {
        Ok(rate) => rate,
        Err(e) => return Ok(Parsed::Invalid(e.context(format!("plan {}", plan_id)))),
    };

    Ok(Parsed::Row(Plan::new(plan_id, metal_level, rate, rate_area)))
}

// ============================================================================
// INDEX PRODUCERS (blocking, run on tokio's blocking pool)
// ============================================================================

/// Stream every ZIP → rate area link into `tx`. Dropping `tx` on return
/// closes the channel, which is the builder's completion signal.
pub fn load_zips<R: Read>(
    source: CsvSource<R>,
    mode: ReadMode,
    tx: mpsc::Sender<ZipRateLink>,
) -> Result<SourceStats> {
    drain(source, mode, parse_zip_link, |link| tx.blocking_send(link).is_ok())
}

/// Stream every Silver plan into `tx`
pub fn load_plans<R: Read>(
    source: CsvSource<R>,
    mode: ReadMode,
    tx: mpsc::Sender<Plan>,
) -> Result<SourceStats> {
    drain(source, mode, parse_silver_plan, |plan| tx.blocking_send(plan).is_ok())
}

// ============================================================================
// TARGET LIST
// ============================================================================

/// TargetList - ZIPs to resolve, in input order
///
/// Duplicates are kept: a ZIP listed twice is answered twice.
#[derive(Debug, Clone, Default)]
pub struct TargetList {
    order: Vec<ZipCode>,
    first_seen: HashMap<ZipCode, usize>,
}

impl TargetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, zip: ZipCode) {
        let next = self.order.len();
        self.first_seen.entry(zip.clone()).or_insert(next);
        self.order.push(zip);
    }

    /// Position of the first row listing `zip`
    pub fn position(&self, zip: &ZipCode) -> Option<usize> {
        self.first_seen.get(zip).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZipCode> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of distinct ZIPs
    pub fn distinct(&self) -> usize {
        self.first_seen.len()
    }
}

impl<Z: Into<ZipCode>> FromIterator<Z> for TargetList {
    fn from_iter<I: IntoIterator<Item = Z>>(iter: I) -> Self {
        let mut list = TargetList::new();
        for zip in iter {
            list.push(zip.into());
        }
        list
    }
}

/// slcsp.csv row: zipcode,rate (rate column is what we compute, ignored here)
pub fn load_targets<R: Read>(source: CsvSource<R>, mode: ReadMode) -> Result<TargetList> {
    let mut targets = TargetList::new();
    drain(
        source,
        mode,
        |row| Ok(Parsed::Row(ZipCode::new(row.field(TARGET_COL_ZIP)?))),
        |zip| {
            targets.push(zip);
            true
        },
    )?;

    Ok(targets)
}

// ============================================================================
// TESTS
// ============================================================================
