use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dronedrop::*;

// ---------- Constants ----------
const DEFAULT_SECONDS: f32 = 60.0;
// Simulated frame length fed to the fixed-step accumulator.
const FRAME_SECONDS: f32 = 1.0 / 30.0;

#[derive(Parser)]
#[command(about = "Run the delivery dispatch simulation without a display")]
struct CliArgs {
	/// JSON file with simulation settings; defaults apply to missing fields.
	#[arg(long)]
	config: Option<PathBuf>,

	/// Simulated seconds to run.
	#[arg(long, default_value_t = DEFAULT_SECONDS)]
	seconds: f32,

	/// Overrides the RNG seed from the config.
	#[arg(long)]
	seed: Option<u64>,

	/// Print final world, vehicle and order snapshots as JSON.
	#[arg(long)]
	json: bool,
}

fn main() -> ExitCode {
	init_tracing();
	let args = CliArgs::parse();
	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			tracing::error!("{e}");
			ExitCode::FAILURE
		}
	}
}

fn init_tracing() {
	use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
	tracing_subscriber::registry()
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();
}

fn load_config(args: &CliArgs) -> Result<SimConfig, Box<dyn std::error::Error>> {
	let mut config = match &args.config {
		Some(path) => SimConfig::from_json_str(&std::fs::read_to_string(path)?)?,
		None => SimConfig::default(),
	};
	if args.seed.is_some() {
		config.seed = args.seed;
	}
	config.validate()?;
	Ok(config)
}

fn run(args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
	let config = load_config(args)?;
	let mut engine = Engine::new(config)?;
	engine.subscribe(|e: &LogEvent| println!("{}", format_log_line(e)));
	engine.start()?;

	let mut remaining = args.seconds.max(0.0);
	while remaining > 0.0 {
		let frame = remaining.min(FRAME_SECONDS);
		engine.advance(frame)?;
		remaining -= frame;
	}

	println!("{}", format_stats(&engine.stats()));
	for line in format_order_queue(&engine.order_summaries()) {
		println!("{line}");
	}

	if args.json {
		let dump = serde_json::json!({
			"tick": engine.now(),
			"world": engine.world_snapshot(),
			"vehicles": engine.vehicle_snapshots(),
			"orders": engine.order_summaries(),
			"packages": engine.packages(),
		});
		println!("{}", serde_json::to_string_pretty(&dump)?);
	}
	Ok(())
}
