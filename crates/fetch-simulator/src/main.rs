//! Fetch Strategy Simulator CLI
//!
//! Runs a cache/network strategy repeatedly against simulated sources and
//! reports every response it forwards.

use anyhow::Result;
use clap::Parser;
use fetch_domain::SealedResponse;
use fetch_simulator::{RunReport, Scenario, SimulatorConfig};
use fetch_strategies::Strategy;
use tokio::time::sleep;
use tracing::{info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "fetch-simulator")]
#[command(about = "Exercise cache/network strategies against simulated sources")]
struct Args {
    /// Strategy to run: CN, NC, CNC, CorN or NorC
    #[arg(short, long)]
    strategy: Option<Strategy>,

    /// Number of strategy invocations
    #[arg(short, long)]
    runs: Option<u32>,

    /// Cache latency in milliseconds
    #[arg(long)]
    cache_latency_ms: Option<u64>,

    /// Network latency in milliseconds
    #[arg(long)]
    network_latency_ms: Option<u64>,

    /// Probability that a cache read fails
    #[arg(long)]
    cache_failure_rate: Option<f64>,

    /// Probability that a network fetch fails
    #[arg(long)]
    network_failure_rate: Option<f64>,

    /// Probability that a cache write-back fails
    #[arg(long)]
    write_failure_rate: Option<f64>,

    /// Start with a populated cache
    #[arg(long)]
    seed_cache: bool,

    /// Print run reports as JSON lines
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, config: &mut SimulatorConfig) {
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(latency_ms) = self.cache_latency_ms {
            config.cache.latency_ms = latency_ms;
        }
        if let Some(latency_ms) = self.network_latency_ms {
            config.network.latency_ms = latency_ms;
        }
        if let Some(rate) = self.cache_failure_rate {
            config.cache.failure_rate = rate;
        }
        if let Some(rate) = self.network_failure_rate {
            config.network.failure_rate = rate;
        }
        if let Some(rate) = self.write_failure_rate {
            config.write_failure_rate = rate;
        }
        config.seed_cache |= self.seed_cache;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = SimulatorConfig::from_env()?;
    args.apply(&mut config);
    config.validate()?;

    init_tracing(&config);

    info!(
        version = fetch_strategies::VERSION,
        strategy = %config.strategy,
        runs = config.runs,
        "Starting strategy simulation"
    );

    let scenario = Scenario::from_config(&config);

    for run in 1..=config.runs {
        let report = scenario.run().await?;

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            log_report(run, config.runs, &report);
        }

        sleep(config.settle_delay()).await;
    }

    let cached = scenario.cache().snapshot().await;
    info!(
        network_revision = scenario.network().revision(),
        cached_revision = ?cached.map(|catalog| catalog.revision),
        "Simulation complete"
    );

    Ok(())
}

fn init_tracing(config: &SimulatorConfig) {
    subscriber(config, std::io::stderr).init();
}

/// Log subscriber writing to `writer`; stdout stays reserved for run reports.
fn subscriber<W>(config: &SimulatorConfig, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    if config.log_json {
        Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer)),
        )
    } else {
        Box::new(
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer)),
        )
    }
}

fn log_report(run: u32, total: u32, report: &RunReport) {
    info!(
        "Run {}/{} | {} | {} response(s)",
        run,
        total,
        report.strategy,
        report.responses.len()
    );

    for observed in &report.responses {
        match &observed.response {
            SealedResponse::Success(catalog) => info!(
                "  +{}ms OK revision {} ({} entries)",
                observed.elapsed_ms,
                catalog.revision,
                catalog.entries.len()
            ),
            SealedResponse::Error(error) => {
                info!("  +{}ms ERROR {}", observed.elapsed_ms, error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(config: &SimulatorConfig) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = subscriber(config, move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            info!(runs = 1, "Starting strategy simulation");
        });

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_logs_go_to_given_writer() {
        let logs = captured_logs(&SimulatorConfig::default());

        assert!(logs.contains("Starting strategy simulation"));
    }

    #[test]
    fn test_json_logs_go_to_given_writer() {
        let config = SimulatorConfig {
            log_json: true,
            ..SimulatorConfig::default()
        };
        let logs = captured_logs(&config);

        let line: serde_json::Value = serde_json::from_str(logs.trim()).unwrap();
        assert_eq!(line["fields"]["message"], "Starting strategy simulation");
    }
}
