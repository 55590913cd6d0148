use cgroup_metrics::config::Config;

/// Entry point of the `cgroup-metrics` poller.
///
/// Reads its configuration from the environment, then prints one JSON report per
/// poll interval until interrupted.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the Ctrl-C handler cannot be
/// installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug POLL_INTERVAL_SECS=5 FLATTEN_METRICS=1 cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = Config::from_env()?;
    cgroup_metrics::run(config).await
}
