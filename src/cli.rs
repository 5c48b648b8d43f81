//! Command-line interface for dogsh
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Random dog pictures with narrated breeds and voice search
#[derive(Parser, Debug)]
#[command(
    name = "dogsh",
    version,
    about = "Random dog pictures with narrated breeds and voice search"
)]
pub struct Cli {
    /// Subcommand to execute (default: interactive session)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug logs, -vv: trace logs)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a recording limit into whole seconds.
///
/// Accepts bare numbers (seconds) and anything `humantime` understands
/// (`7s`, `1m`).
fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let secs = match s.parse::<u64>() {
        Ok(secs) => secs,
        Err(_) => humantime::parse_duration(s)
            .map(|d| d.as_secs())
            .map_err(|e| e.to_string())?,
    };
    if secs == 0 {
        return Err("duration must be at least one second".to_string());
    }
    Ok(secs)
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a random dog image
    Fetch {
        /// Restrict to a breed, e.g. "husky" or "golden retriever"
        #[arg(long, short, value_name = "BREED")]
        breed: Option<String>,

        /// Do not narrate the breed
        #[arg(long)]
        no_speak: bool,
    },

    /// Say a breed name and show a picture of it
    Search {
        /// Recording limit (default: from config, 7s). Examples: 5, 7s, 1m
        #[arg(long, short = 'd', value_name = "DURATION", value_parser = parse_duration_secs)]
        max_duration: Option<u64>,
    },

    /// Narrate a breed name the way fetched images are narrated
    Speak {
        /// Breed to narrate
        #[arg(required = true, num_args = 1..)]
        breed: Vec<String>,
    },

    /// Play a sample with the selected (or given) voice
    TestVoice {
        /// Voice preset (alloy, echo, fable, onyx, nova, shimmer)
        #[arg(long, value_name = "VOICE")]
        voice: Option<String>,
    },

    /// List narration voices
    Voices,

    /// Check system dependencies
    Check,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (API key masked)
    Show,

    /// Print the configuration file path
    Path,

    /// Print a template with every default
    Dump,
}
