//! Send pageview events to a Divolte collector from the command line.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use divolte_beacon::config::{ENDPOINT_VAR, SCRIPT_URL_VAR};
use divolte_beacon::{Beacon, BeaconConfig, HttpTransport, PageEnvironment, PageView, ViewportSources};

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Send pageview events to a Divolte collector")]
#[command(version)]
struct Cli {
    /// Collector base URL (overrides DIVOLTE_ENDPOINT)
    #[arg(long, conflicts_with = "script_url")]
    endpoint: Option<String>,

    /// URL the collector serves dvt.js from (overrides DIVOLTE_SCRIPT_URL)
    #[arg(long)]
    script_url: Option<String>,

    /// Page location
    #[arg(long)]
    location: Option<String>,

    /// Referring page
    #[arg(long)]
    referrer: Option<String>,

    /// Available screen size, WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    screen: Option<(u32, u32)>,

    /// Viewport size, WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    viewport: Option<(u32, u32)>,

    /// Additional events to send after the initial pageview
    #[arg(long, default_value_t = 0)]
    count: u32,

    /// Milliseconds to wait for in-flight events before exiting
    #[arg(long, default_value_t = 2000)]
    settle_ms: u64,
}

fn parse_size(raw: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let w = w.trim().parse().map_err(|_| format!("bad width in {raw:?}"))?;
    let h = h.trim().parse().map_err(|_| format!("bad height in {raw:?}"))?;
    Ok((w, h))
}

/// The page described on the command line.
struct CliPage(PageView);

impl CliPage {
    fn from_cli(cli: &Cli) -> Self {
        let (screen_width, screen_height) = cli.screen.map_or((None, None), |(w, h)| (Some(w), Some(h)));
        let (viewport_width, viewport_height) = cli
            .viewport
            .map_or((ViewportSources::default(), ViewportSources::default()), |(w, h)| {
                (ViewportSources::window(w), ViewportSources::window(h))
            });

        Self(PageView {
            location: cli.location.clone(),
            referrer: cli.referrer.clone(),
            screen_width,
            screen_height,
            viewport_width,
            viewport_height,
        })
    }
}

impl PageEnvironment for CliPage {
    fn page_view(&self) -> PageView {
        self.0.clone()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("divolte_beacon=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Command-line endpoint settings replace both environment variables.
    let overridden = cli.endpoint.is_some() || cli.script_url.is_some();
    let config = BeaconConfig::from_lookup(|key| match key {
        ENDPOINT_VAR if overridden => cli.endpoint.clone(),
        SCRIPT_URL_VAR if overridden => cli.script_url.clone(),
        _ => env::var(key).ok(),
    })
    .context("Failed to load beacon configuration")?;
    config.log();

    let transport = HttpTransport::new(config.timeout)?;
    let beacon = Beacon::init(&config.resolver(), CliPage::from_cli(&cli), transport.clone())?;

    for _ in 0..cli.count {
        beacon.signal();
    }
    info!(events = cli.count + 1, "Events dispatched");

    if !transport.settle(Duration::from_millis(cli.settle_ms)).await {
        warn!(pending = transport.in_flight(), "Exiting with events still in flight");
    }
    Ok(())
}
