use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser, Clone)]
#[command(name = "advsound", version)]
#[command(about = "Play sounds through the advsound controller")]
pub struct Cli {
    /// Configuration file. Defaults to `config.json` in the user config dir.
    #[arg(long, global = true, env = "ADVSOUND_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Queue a sound and play it to the end.
    Play(PlayArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Args, Clone)]
pub struct PlayArgs {
    /// File path or http(s) URL of the sound.
    pub uri: String,

    /// Mixer technology; overrides the configured one.
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Volume in percent, clamped to 0..=100.
    #[arg(long, allow_negative_numbers = true)]
    pub volume: Option<i64>,

    /// Place the sound relative to the listener.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pub position: Option<Vec<f32>>,

    /// Repeat the sound.
    #[arg(long = "loop")]
    pub looped: bool,

    /// Play as background music, unattenuated.
    #[arg(long, conflicts_with = "position")]
    pub background: bool,

    /// Stop after this many seconds. Looped sounds play until stopped otherwise.
    #[arg(long)]
    pub seconds: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// All sounds mixed into one output stream.
    #[default]
    Software,
    /// One output stream per sound from a bounded voice pool.
    Hardware,
}
