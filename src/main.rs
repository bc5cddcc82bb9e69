//! Drives the scheduler from the terminal, using simulated devices.
use std::time::Duration;

use clap::Parser;
use jukebox::{sim, Config, Controller, SessionId, Volume};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod input;

/// A per-session playback scheduler, driven from stdin.
#[derive(Parser, Clone)]
#[command(about, version)]
struct Args {
    /// Starting volume of new sessions, from 0 to 100.
    #[clap(long, short, default_value_t = 50, value_parser = clap::value_parser!(u16).range(0..=100))]
    volume: u16,

    /// Average length of a simulated track, in seconds, at most a day.
    #[clap(long, short, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    length: u64,

    /// The session which commands are sent to at first.
    #[clap(long, short, default_value_t = 1)]
    session: u64,

    /// Include debug logs.
    #[clap(long, short)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    let fallback = if args.debug {
        "jukebox=debug"
    } else {
        "jukebox=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        volume: Volume::from_percent(args.volume.into())?,
        ..Config::default()
    };
    let resolver = sim::Resolver {
        length: Duration::from_secs(args.length),
    };

    let (controller, server) = Controller::spawn(config, resolver, sim::Connector);
    let report = tokio::spawn(input::report(controller.subscribe()));

    let result = input::listen(&controller, SessionId(args.session)).await;

    controller.shutdown()?;
    server.await?;
    report.abort();

    result
}
