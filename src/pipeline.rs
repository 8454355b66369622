// 🔀 Pipeline - Fan-in of the three inputs, then resolution
//
//   zips.csv  ──producer──▶ mpsc ──▶ RateAreaIndex::build ─┐
//   plans.csv ──producer──▶ mpsc ──▶ PlanIndex::build ─────┼─▶ Resolver ─▶ Report
//   slcsp.csv ──load_targets───────────────────────────────┘

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use tokio::sync::mpsc;
use tokio::task;
use tracing::info;

use crate::config::Config;
use crate::index::{PlanIndex, RateAreaIndex};
use crate::loader::{load_plans, load_targets, load_zips};
use crate::model::{Plan, ZipRateLink};
use crate::resolver::{Report, Resolver};
use crate::source::{CsvSource, ReadMode};

/// Capacity of the producer → builder channels. A full channel blocks the
/// producer until its builder catches up.
const LINK_CHANNEL_CAPACITY: usize = 64;
const PLAN_CHANNEL_CAPACITY: usize = 64;

/// The three opened inputs
pub struct Inputs<Z: Read, P: Read, T: Read> {
    pub zips: CsvSource<Z>,
    pub plans: CsvSource<P>,
    pub targets: CsvSource<T>,
}

impl Inputs<File, File, File> {
    /// Open every input up front, so a missing file fails the run before any
    /// work starts and before anything is written.
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Inputs {
            zips: CsvSource::open(&config.zips)?,
            plans: CsvSource::open(&config.plans)?,
            targets: CsvSource::open(&config.targets)?,
        })
    }
}

/// Open the configured files and resolve every target ZIP
pub async fn run(config: &Config) -> Result<Report> {
    let inputs = Inputs::open(config)?;
    resolve_inputs(inputs, config.read_mode()).await
}

/// Build both indexes concurrently while the target list loads, wait for all
/// of them, then resolve in target order.
pub async fn resolve_inputs<Z, P, T>(inputs: Inputs<Z, P, T>, mode: ReadMode) -> Result<Report>
where
    Z: Read + Send + 'static,
    P: Read + Send + 'static,
    T: Read + Send + 'static,
{
    let Inputs { zips, plans, targets } = inputs;

    let (link_tx, link_rx) = mpsc::channel::<ZipRateLink>(LINK_CHANNEL_CAPACITY);
    let (plan_tx, plan_rx) = mpsc::channel::<Plan>(PLAN_CHANNEL_CAPACITY);

    // Each builder is the only owner of its index until its channel closes.
    let rate_area_builder = tokio::spawn(RateAreaIndex::build(link_rx));
    let plan_builder = tokio::spawn(PlanIndex::build(plan_rx));

    let zip_producer = task::spawn_blocking(move || load_zips(zips, mode, link_tx));
    let plan_producer = task::spawn_blocking(move || load_plans(plans, mode, plan_tx));
    let target_loader = task::spawn_blocking(move || load_targets(targets, mode));

    let (zip_stats, plan_stats, targets, rate_areas, plans) = tokio::try_join!(
        zip_producer,
        plan_producer,
        target_loader,
        rate_area_builder,
        plan_builder
    )
    .context("Loader task failed")?;

    let zip_stats = zip_stats.context("Failed to load rate areas")?;
    let plan_stats = plan_stats.context("Failed to load plans")?;
    let targets = targets.context("Failed to load target ZIPs")?;

    info!(
        zip_rows = zip_stats.rows,
        zips = rate_areas.len(),
        plan_rows = plan_stats.rows,
        silver_plans = plan_stats.forwarded,
        rate_areas = plans.len(),
        targets = targets.len(),
        distinct_targets = targets.distinct(),
        "indexes ready"
    );

    let resolver = Resolver::new(rate_areas, plans);
    let report = resolver.resolve(&targets);

    for (status, count) in report.summary() {
        info!(status = status.code(), count, "resolution summary");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(zips: &'static str, plans: &'static str, targets: &'static str) -> Inputs<&'static [u8], &'static [u8], &'static [u8]> {
        Inputs {
            zips: CsvSource::from_reader("zips.csv", zips.as_bytes()),
            plans: CsvSource::from_reader("plans.csv", plans.as_bytes()),
            targets: CsvSource::from_reader("slcsp.csv", targets.as_bytes()),
        }
    }

    const ZIPS: &str = "zipcode,state,county_code,name,rate_area
64148,MO,29095,Jackson,3
67118,KS,20155,Reno,6
";

    const PLANS: &str = "plan_id,state,metal_level,rate,rate_area
78421VV7272023,MO,Silver,290.05,3
35866RG6997149,MO,Silver,234.6,3
02345TB1383341,MO,Silver,245.2,3
99471AK3918170,MO,Gold,198.24,3
56834OY7425326,KS,Silver,212.35,6
";

    #[tokio::test]
    async fn test_resolve_inputs_in_target_order() {
        let report = resolve_inputs(inputs(ZIPS, PLANS, "zipcode,rate\n67118,\n64148,\n"), ReadMode::Lenient)
            .await
            .unwrap();

        let rows: Vec<(&str, Option<&str>)> = report.rows.iter().map(|r| (r.zip.as_str(), r.rate())).collect();
        assert_eq!(rows, vec![("67118", None), ("64148", Some("245.2"))]);
    }

    #[tokio::test]
    async fn test_strict_mode_fails_on_bad_plan_row() {
        let plans = "plan_id,state,metal_level,rate,rate_area\nX,MO,Silver,abc,3\n";
        let result = resolve_inputs(inputs(ZIPS, plans, "zipcode,rate\n64148,\n"), ReadMode::Strict).await;

        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains("Failed to load plans"));
        assert!(msg.contains("plans.csv"));
    }

    #[tokio::test]
    async fn test_bad_rate_in_one_area_leaves_later_area_resolved() {
        let plans = "plan_id,state,metal_level,rate,rate_area
A,MO,Silver,250.00,3
B,MO,Silver,240.00,3
X,MO,Silver,N/A,3
C,KS,Silver,212.35,6
D,KS,Silver,220.00,6
";
        let report = resolve_inputs(inputs(ZIPS, plans, "zipcode,rate\n64148,\n67118,\n"), ReadMode::Lenient)
            .await
            .unwrap();

        let rows: Vec<(&str, Option<&str>)> = report.rows.iter().map(|r| (r.zip.as_str(), r.rate())).collect();
        assert_eq!(rows, vec![("64148", Some("250.00")), ("67118", Some("220.00"))]);
    }

    #[tokio::test]
    async fn test_more_rows_than_channel_capacity() {
        let mut plans = String::from("plan_id,state,metal_level,rate,rate_area\n");
        for i in 0..(PLAN_CHANNEL_CAPACITY * 4) {
            plans.push_str(&format!("P{},MO,Silver,{}.00,3\n", i, 500 - i));
        }
        let plans: &'static str = Box::leak(plans.into_boxed_str());

        let report = resolve_inputs(inputs(ZIPS, plans, "zipcode,rate\n64148,\n"), ReadMode::Strict)
            .await
            .unwrap();

        // lowest is 500 - 255 = 245, second lowest 246
        assert_eq!(report.rows[0].rate(), Some("246.00"));
    }
}
