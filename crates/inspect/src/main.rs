use std::fs::File;
use std::io::BufReader;

use resp_inspect::config::Cli;
use resp_inspect::config::Parser;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let args = Cli::parse();
	let config = resp_inspect::config::load(&args)?;
	telemetry::init(&config.log_level)?;

	let stdout = std::io::stdout().lock();
	let summary = match &args.input {
		Some(path) => {
			info!(path = %path.display(), "Inspecting capture");
			let file = File::open(path)?;
			resp_inspect::run(&config, BufReader::new(file), stdout)?
		}
		None => {
			info!("Inspecting stdin");
			resp_inspect::run(&config, std::io::stdin().lock(), stdout)?
		}
	};

	info!(
		frames = summary.frames,
		trailing = summary.trailing,
		skipped = summary.skipped,
		"Inspection finished"
	);
	Ok(())
}
