use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gesture_replay::{check_expected, parse_expected_kinds, parse_trace_file, render_csv, replay};
use holdgate::{load_config, HoldgateConfig};

#[derive(Debug, Parser)]
#[command(name = "gesture_replay")]
#[command(about = "Replay a touch/voice trace through the holdgate gesture controller")]
struct Cli {
    trace: PathBuf,
    /// File with one expected event kind per line.
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HoldgateConfig::default(),
    };
    let records = parse_trace_file(&cli.trace)?;
    log::info!("replay: {} records from {}", records.len(), cli.trace.display());

    let events = replay(&config, &records)?;
    print!("{}", render_csv(&events));

    if let Some(expect_path) = cli.expect {
        let text = fs::read_to_string(&expect_path)
            .with_context(|| format!("failed to open {}", expect_path.display()))?;
        check_expected(&events, &parse_expected_kinds(&text))?;
    }
    Ok(())
}
