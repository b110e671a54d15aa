//! Seam CLI - headless nested scroll playback
//!
//! Replays gesture scripts against a coordinator, an embedded content
//! scroller and a list, and prints the offsets frame by frame:
//! - `seam run <scenario>` plays a built-in scenario
//! - `seam run --script gesture.json` plays a script file
//! - `seam scenarios` lists the built-in scenarios
//! - `seam config init|check` manages `seam.toml`

mod config;
mod run;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use seam_scroll::headless::scenarios;
use seam_scroll::ScrollConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{SeamConfig, CONFIG_FILE};

/// Replay nested scroll gestures headlessly
#[derive(Parser, Debug)]
#[command(name = "seam")]
#[command(about = "Replay nested scroll gestures headlessly and inspect their traces")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a built-in scenario or a gesture script
    Run {
        /// Built-in scenario name (see `seam scenarios`)
        #[arg(required_unless_present = "script", conflicts_with = "script")]
        scenario: Option<String>,

        /// JSON gesture script to play instead of a built-in scenario
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Configuration file (seam.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tuning preset, instead of a configuration file
        #[arg(long, value_enum, conflicts_with = "config")]
        preset: Option<Preset>,

        /// Frames to run after the script ends
        #[arg(long)]
        frames: Option<u32>,

        /// Print every n-th animation frame
        #[arg(long)]
        every: Option<u32>,

        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in scenarios
    Scenarios,

    /// Print a built-in scenario as a JSON script
    Export {
        /// Built-in scenario name
        scenario: String,
    },

    /// Manage seam.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a starter seam.toml
    Init {
        /// Target file or directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Check {
        /// File or directory to check
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    Default,
    Stiff,
    Gentle,
}

impl Preset {
    fn scroll_config(self) -> ScrollConfig {
        match self {
            Preset::Default => ScrollConfig::default(),
            Preset::Stiff => ScrollConfig::stiff(),
            Preset::Gentle => ScrollConfig::gentle(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn,seam_cli=info",
        1 => "info,seam_scroll=debug,seam_cli=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run {
            scenario,
            script,
            config,
            preset,
            frames,
            every,
            json,
        } => cmd_run(scenario, script, config, preset, frames, every, json),
        Command::Scenarios => cmd_scenarios(),
        Command::Export { scenario } => cmd_export(&scenario),
        Command::Config { action } => match action {
            ConfigAction::Init { path, force } => cmd_config_init(path, force),
            ConfigAction::Check { path } => cmd_config_check(path),
        },
    }
}

fn cmd_run(
    scenario: Option<String>,
    script: Option<PathBuf>,
    config: Option<PathBuf>,
    preset: Option<Preset>,
    frames: Option<u32>,
    every: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut seam_config = match config {
        Some(path) => SeamConfig::load(&path)?,
        None => SeamConfig::default(),
    };
    if let Some(preset) = preset {
        seam_config.scroll = preset.scroll_config();
    }
    if let Some(frames) = frames {
        seam_config.playback.extra_frames = frames;
    }
    if let Some(every) = every {
        seam_config.playback.every = every;
    }

    let script = match (script, scenario) {
        (Some(path), _) => run::load_script(&path)?,
        (None, Some(name)) => run::builtin(&name)?,
        (None, None) => anyhow::bail!("Give a scenario name or --script"),
    };

    let report = run::play(&script, &seam_config)?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text(seam_config.playback.every));
    }
    if !report.settled {
        tracing::warn!("'{}' was still animating when playback ended", report.scenario);
    }
    Ok(())
}

fn cmd_scenarios() -> Result<()> {
    for script in scenarios::all() {
        println!("{:<24} {}", script.name, script.description);
    }
    Ok(())
}

fn cmd_export(name: &str) -> Result<()> {
    let script = run::builtin(name)?;
    println!("{}", script.to_json()?);
    Ok(())
}

fn cmd_config_init(path: PathBuf, force: bool) -> Result<()> {
    let written = SeamConfig::init(&path, force)?;
    tracing::info!("Wrote {}", written.display());
    println!("Created {}", written.display());
    Ok(())
}

fn cmd_config_check(path: PathBuf) -> Result<()> {
    let config = SeamConfig::load(&path)?;
    println!(
        "{} is valid: touch_slop={} fling friction={} stop_velocity={}",
        path.display(),
        config.scroll.touch_slop,
        config.scroll.fling.friction,
        config.scroll.fling.stop_velocity
    );
    Ok(())
}
