//! Tycoon Sim - Main binary
//!
//! Runs the trading/mining tycoon economy headless: advances the world tick
//! by tick, optionally plays a scripted demo player against it, and prints a
//! summary at the end. Useful for benchmarks, CI, and soak-testing the
//! deterministic pipeline.

mod config;

use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use simulation::{GameWorld, TickEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::OrderKind;

pub use config::RunConfig;

/// Tycoon Sim - deterministic trading/mining economy runner
#[derive(Parser, Debug)]
#[command(name = "tycoon-sim")]
#[command(about = "Headless runner for the trading/mining tycoon simulation core")]
#[command(version)]
struct Args {
    /// Total ticks to run
    #[arg(long, env = "SIM_TICKS")]
    ticks: Option<u64>,

    /// Master seed for the market's random streams
    #[arg(long, env = "SIM_SEED")]
    seed: Option<u64>,

    /// Tick delay in milliseconds
    #[arg(long, env = "SIM_TICK_DELAY")]
    tick_delay: Option<u64>,

    /// Starting cash balance
    #[arg(long, env = "SIM_BALANCE")]
    balance: Option<f64>,

    /// Disable the scripted demo player
    #[arg(long, env = "SIM_NO_DEMO")]
    no_demo: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Build config with CLI/env overrides
    let mut config = RunConfig::default();
    if let Some(ticks) = args.ticks {
        config.total_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(delay) = args.tick_delay {
        config.tick_delay_ms = delay;
    }
    if let Some(balance) = args.balance {
        config.starting_balance = balance;
    }
    config.demo_script = !args.no_demo;
    config.verbose = args.verbose;

    let filter = if config.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        ticks = config.total_ticks,
        seed = config.seed,
        balance = config.starting_balance,
        demo = config.demo_script,
        "starting run"
    );
    run(config);
}

fn run(config: RunConfig) {
    let total_ticks = config.total_ticks;
    let mut world = GameWorld::new(config.world_config());

    if config.demo_script {
        play_demo_opening(&mut world);
    }

    eprintln!("Running {} ticks...", total_ticks);
    let start = Instant::now();

    let mut orders_executed = 0u64;
    let mut miners_failed = 0u64;
    let mut market_events = 0u64;

    for tick in 0..total_ticks {
        let report = world.step();
        for event in &report.events {
            match event {
                TickEvent::OrderExecuted { .. } => orders_executed += 1,
                TickEvent::MinerFailed(_) => miners_failed += 1,
                TickEvent::EventStarted(_) => market_events += 1,
                _ => {}
            }
        }

        if config.demo_script {
            play_demo_tick(&mut world, tick);
        }

        if config.tick_delay_ms > 0 {
            thread::sleep(Duration::from_millis(config.tick_delay_ms));
        }

        // Progress every 10%
        if tick > 0 && tick % (total_ticks / 10).max(1) == 0 {
            let pct = (tick * 100) / total_ticks;
            eprintln!("  {}% ({}/{} ticks)", pct, tick, total_ticks);
        }
    }

    let elapsed = start.elapsed();
    let progression = world.progression();

    eprintln!();
    eprintln!("╔═══════════════════════════════════════════════════════════════════════╗");
    eprintln!("║  Run Complete                                                         ║");
    eprintln!("╠═══════════════════════════════════════════════════════════════════════╣");
    eprintln!(
        "║  Ticks: {:8}  │  Elapsed: {:6.2}s  │  Rate: {:8.0} ticks/s     ║",
        total_ticks,
        elapsed.as_secs_f64(),
        total_ticks as f64 / elapsed.as_secs_f64()
    );
    eprintln!(
        "║  Net Worth: {:12.2}  │  Balance: {:12.2}                 ║",
        world.net_worth(),
        world.trading().balance
    );
    eprintln!(
        "║  Level: {:3} ({})  │  XP: {:8}  │  Streak: {:3}                 ║",
        progression.level, progression.league, progression.xp, progression.streak
    );
    eprintln!(
        "║  Orders Executed: {:6}  │  Miners Failed: {:4}  │  Events: {:4}   ║",
        orders_executed, miners_failed, market_events
    );
    eprintln!(
        "║  Mined (unsold): {:12.6}  │  Hashrate: {:10.2} TH/s        ║",
        world.mining().mined,
        world.mining().total_hashrate
    );
    eprintln!("╚═══════════════════════════════════════════════════════════════════════╝");
}

/// Opening moves for the demo player: a starter position with a stop loss
/// and the cheapest possible farm.
fn play_demo_opening(world: &mut GameWorld) {
    if let Ok(result) = world.buy("BTC", 0.05) {
        info!(message = %result.message, "demo: opening buy");
    }
    if let Some(price) = world.price("BTC") {
        let _ = world.place_order("BTC", OrderKind::StopLoss, price * 0.9, 0.05);
    }
    if let Ok(rack) = world.buy_rack("rack_shelf") {
        let _ = world.buy_miner("gpu_old", rack);
    }
}

/// Periodic demo actions: sell mined coin hourly, answer a quiz every ten
/// minutes of simulated time.
fn play_demo_tick(world: &mut GameWorld, tick: u64) {
    if tick > 0 && tick % 3_600 == 0 {
        if let Ok((proceeds, _)) = world.sell_mined() {
            if proceeds > 0.0 {
                info!(proceeds, "demo: sold mined coin");
            }
        }
    }
    if tick > 0 && tick % 600 == 0 {
        let difficulty = 1.0 + (tick / 600 % 3) as f64;
        world.answer_quiz(true, difficulty);
    }
}
