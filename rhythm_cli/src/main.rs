use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};

mod logging;
mod replay;

#[derive(Debug, Parser)]
#[command(name = "rhythm")]
#[command(about = "Rhythm game beatmap tools", long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a text beatmap to JSON
    Convert {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Play an input script against a beatmap on a simulated audio device
    Replay {
        beatmap: PathBuf,
        /// Lines of `<seconds> <lane or key>`
        #[arg(long)]
        inputs: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// High score file, written when the previous best is beaten
        #[arg(long)]
        score_file: Option<PathBuf>,
        #[arg(long, default_value_t = 240)]
        tick_hz: u32,
        /// Overrides the high score read from --score-file
        #[arg(long)]
        high_score: Option<u64>,
        /// Clip length in seconds; defaults to the last note plus two seconds
        #[arg(long)]
        duration: Option<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    match cli.command {
        Command::Convert { input, output } => {
            let beatmap = beatmap_loader::parse_beatmap_file(&input)
                .with_context(|| format!("convert failed: {}", input.display()))?;

            let json =
                serde_json::to_string_pretty(&beatmap).context("failed to serialize beatmap")?;
            let out_path = output.unwrap_or_else(|| default_output_path(&input));
            fs::write(&out_path, json)
                .with_context(|| format!("failed to write: {}", out_path.display()))?;
        }
        Command::Replay {
            beatmap,
            inputs,
            config,
            score_file,
            tick_hz,
            high_score,
            duration,
        } => {
            let options = replay::ReplayOptions {
                beatmap,
                inputs,
                config,
                score_file,
                tick_hz,
                high_score,
                duration,
            };
            replay::run_replay(&options)?;
        }
    }

    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let mut out = input.to_path_buf();
    out.set_extension("json");
    out
}
