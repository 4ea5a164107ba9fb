use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use scenario::ScenarioConfig;
use server::FeedState;
use tracks::TrackSet;

mod scenario;
mod server;
mod tracks;

#[derive(Parser)]
#[command(author, version, about = "Skytrail feed stand-in: history endpoint + websocket push")]
struct Args {
    /// Address to serve /points_history and /ws on
    #[arg(long, default_value = "127.0.0.1:12345")]
    bind: SocketAddr,
    /// Milliseconds between position updates
    #[arg(long, default_value_t = 500)]
    rate_ms: u64,
    /// Number of synthetic aircraft when no scenario file is given
    #[arg(long, default_value_t = 5)]
    aircraft: usize,
    /// Deterministic PRNG seed so runs replay consistently
    #[arg(long, default_value_t = 312)]
    seed: u64,
    /// Load aircraft from a YAML scenario instead of the built-in set
    #[arg(long)]
    scenario: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = if let Some(path) = args.scenario {
        ScenarioConfig::load(path)?
    } else {
        ScenarioConfig::default_with_count(args.aircraft)
    };

    let state = FeedState::new();
    let mut tracks = TrackSet::new(&scenario.aircraft);
    anyhow::ensure!(!tracks.is_empty(), "scenario contains no aircraft");

    info!(
        "feeding {} aircraft every {}ms on {}",
        tracks.len(),
        args.rate_ms,
        args.bind
    );

    let generator_state = state.clone();
    let rate = Duration::from_millis(args.rate_ms.max(10));
    let mut rng = StdRng::seed_from_u64(args.seed);
    tokio::spawn(async move {
        // Round-robin means each aircraft reports once per full cycle.
        let dt_secs = rate.as_secs_f64() * tracks.len() as f64;
        let mut ticker = tokio::time::interval(rate);
        loop {
            ticker.tick().await;
            if let Some(record) = tracks.advance(dt_secs, &mut rng) {
                generator_state.publish(record);
            }
        }
    });

    let server = warp::serve(server::routes(state)).run(args.bind);
    tokio::select! {
        _ = server => {}
        result = tokio::signal::ctrl_c() => {
            result.context("awaiting Ctrl+C to exit")?;
            info!("shutting down");
        }
    }

    Ok(())
}
