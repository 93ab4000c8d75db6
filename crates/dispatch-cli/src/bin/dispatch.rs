//! Assign the drone fleet to waiting packages for one snapshot.
//!
//! Usage:
//!   cargo run -p dispatch-cli --bin dispatch -- --depot-lat -37.8152 --depot-lon 144.9639
//!   cargo run -p dispatch-cli --bin dispatch -- --drones drones.json --packages packages.json --audit

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use dispatch_cli::{render_report, Config, RunReport};
use dispatch_core::{
    audit_plan, validate_inputs, Coordinate, DispatchRules, Fleet, Scheduler, ShortestCleaning,
};
use dispatch_feed::{load_drones, load_packages, FeedClient, RetryPolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Cleaning {
    /// Drop cheap packages whose departure window has closed
    Expiry,
    /// Drop cheap packages whose round trip is shorter than the drone's ready time
    RoundTrip,
}

impl From<Cleaning> for ShortestCleaning {
    fn from(value: Cleaning) -> Self {
        match value {
            Cleaning::Expiry => ShortestCleaning::Expiry,
            Cleaning::RoundTrip => ShortestCleaning::RoundTrip,
        }
    }
}

/// Batch drone dispatcher
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Snapshot feed URL (defaults to DISPATCH_FEED_URL)
    #[arg(long)]
    feed_url: Option<String>,

    /// Read drones from a JSON file instead of the feed
    #[arg(long)]
    drones: Option<PathBuf>,

    /// Read packages from a JSON file instead of the feed
    #[arg(long)]
    packages: Option<PathBuf>,

    /// Depot latitude; skips geocoding when given with --depot-lon
    #[arg(long, requires = "depot_lon", allow_negative_numbers = true)]
    depot_lat: Option<f64>,

    /// Depot longitude
    #[arg(long, requires = "depot_lat", allow_negative_numbers = true)]
    depot_lon: Option<f64>,

    /// Depot street address to geocode (defaults to DISPATCH_DEPOT_ADDRESS)
    #[arg(long)]
    depot_address: Option<String>,

    /// Reference instant as unix seconds (default: now)
    #[arg(long)]
    now: Option<i64>,

    /// JSON file with dispatch rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Eviction rule for the cheapest-delivery queue
    #[arg(long, value_enum)]
    cleaning: Option<Cleaning>,

    /// Drone cruise speed in km/h
    #[arg(long)]
    speed: Option<f64>,

    /// Append run statistics and a late-departure check to the output
    #[arg(long, default_value_t = false)]
    audit: bool,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

async fn load_rules(args: &Args) -> Result<DispatchRules> {
    let mut rules = match &args.rules {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read rules file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse rules file {}", path.display()))?
        }
        None => DispatchRules::default(),
    };

    if let Some(cleaning) = args.cleaning {
        rules = rules.with_cleaning(cleaning.into());
    }
    if let Some(speed) = args.speed {
        rules = rules.with_cruise_speed(speed);
    }
    rules.validate()?;
    Ok(rules)
}

fn reference_time(now: Option<i64>) -> Result<DateTime<Utc>> {
    match now {
        Some(secs) => DateTime::from_timestamp(secs, 0)
            .with_context(|| format!("--now {secs} is out of range")),
        None => Ok(Utc::now()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dispatch=info".parse()?)
                .add_directive("dispatch_core=info".parse()?)
                .add_directive("dispatch_feed=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let rules = load_rules(&args).await?;
    let now = reference_time(args.now)?;

    let client = FeedClient::new(args.feed_url.clone().unwrap_or(config.feed_url.clone()))
        .with_retry(RetryPolicy {
            attempts: config.retries,
            ..RetryPolicy::default()
        });

    let depot = match (args.depot_lat, args.depot_lon) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon),
        _ => {
            let address = args.depot_address.as_deref().unwrap_or(&config.depot_address);
            client
                .geocode_depot(&config.geocode_url, address, config.geocode_api_key.as_deref())
                .await
                .with_context(|| format!("Failed to resolve depot address {address:?}"))?
        }
    };

    let drones = async {
        match &args.drones {
            Some(path) => load_drones(path).await,
            None => client.fetch_drones().await,
        }
    };
    let packages = async {
        match &args.packages {
            Some(path) => load_packages(path).await,
            None => client.fetch_packages().await,
        }
    };
    let (drones, packages) = tokio::try_join!(drones, packages)?;

    validate_inputs(&depot, &drones, &packages).context("Rejected snapshot")?;

    tracing::info!(
        drones = drones.len(),
        packages = packages.len(),
        now = %now,
        "scheduling snapshot"
    );

    let fleet = Fleet::ingest(depot, &drones, &packages, now, &rules);
    let scheduler = Scheduler::new(rules);
    let plan = scheduler.run(&fleet);

    let audit = args.audit.then(|| audit_plan(&fleet, &plan));
    let output = render_report(
        &RunReport {
            plan: &plan,
            audit: audit.as_ref(),
        },
        args.pretty,
    )?;
    println!("{output}");

    Ok(())
}
