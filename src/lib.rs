//! cgroup-metrics: memory and CPU accounting for the cgroup v1 container the process runs in.
//!
//! The library reads the `memory` and `cpuacct` controller files through a
//! [`cgroup::CgroupReader`] and derives container-level metrics from them in
//! [`metrics`]. The `cgroup-metrics` binary polls these metrics and prints one JSON
//! document per cycle.
pub mod cgroup;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod metrics;

use serde::Serialize;

use cgroup::CgroupReader;
use config::Config;
use error::{ResultOkLogExt, error_chain};
use metrics::{CpuSample, MetricsOutput, compute_cpu_utilization};

/// One line of output of the polling loop.
#[derive(Debug, Serialize)]
pub struct Report {
    pub metrics: MetricsOutput,
    /// Utilization in percent since the previous successful cycle, if there is one.
    pub cpu_utilization: Option<f64>,
}

/// Runs a single collection cycle.
///
/// Returns the report together with the CPU sample the next cycle compares against.
/// A utilization that cannot be computed is logged and reported as `None`.
pub fn collect_cycle(
    reader: &CgroupReader,
    previous: Option<CpuSample>,
    flatten: bool,
) -> cgroup::Result<(Report, CpuSample)> {
    let before = std::time::Instant::now();
    let metrics = reader.collect_metrics()?;
    log::trace!("collect_metrics() took {} nanoseconds", before.elapsed().as_nanos());

    let sample = metrics.cpuacct.usage;
    let cpu_utilization = match previous {
        Some(previous) => match compute_cpu_utilization(&previous, &sample) {
            Ok(rate) => Some(rate),
            Err(err) => {
                log::warn!("skipping cpu utilization: {err}");
                None
            }
        },
        None => None,
    };

    let report = Report {
        metrics: metrics.into_output(flatten),
        cpu_utilization,
    };
    Ok((report, sample))
}

/// Polls the configured cgroup until Ctrl-C is received.
///
/// A failed cycle is logged and skipped; the last successful CPU sample is kept
/// for the next utilization.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed or a report cannot be
/// serialized.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let reader = config.reader();
    log::debug!("Cgroup root: {}", reader.cgroup_root().display());
    log::debug!("Meminfo path: {}", reader.meminfo_path().display());

    match reader.read_memory_limit() {
        Ok(limit) => log::debug!("Effective memory limit: {limit} bytes"),
        Err(err) => log::warn!("memory limit is unavailable: {}", error_chain(&err)),
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut interval = tokio::time::interval(config.poll_interval);
    let mut previous: Option<CpuSample> = None;
    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                log::info!("Received Ctrl-C, stopping");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        let cycle_reader = reader.clone();
        let flatten = config.flatten;
        let cycle =
            tokio::task::spawn_blocking(move || collect_cycle(&cycle_reader, previous, flatten))
                .await;

        let Some(cycle) = cycle.ok_log("collection task failed") else {
            continue;
        };
        let Some((report, sample)) = cycle.ok_log("failed to collect metrics") else {
            continue;
        };
        previous = Some(sample);
        println!("{}", serde_json::to_string(&report)?);
    }
}
