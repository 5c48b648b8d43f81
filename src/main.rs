use anyhow::Result;
use clap::{CommandFactory, Parser};
use dogsh::app::{list_voices, run_fetch, run_interactive, run_search, run_speak, run_test_voice};
use dogsh::cli::{Cli, Commands, ConfigAction};
use dogsh::config::{Config, ConfigSource, FileConfigSource};
use dogsh::diagnostics::check_dependencies;
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let source = FileConfigSource::from_cli(cli.config.as_deref());
    if cli.config.is_some() {
        // An explicit --config must exist and parse; the default path may be absent.
        Config::load(source.path())?;
    }
    let config: Arc<dyn ConfigSource> = Arc::new(source.clone());

    let ok = match cli.command {
        None => {
            run_interactive(config, cli.quiet).await?;
            true
        }
        Some(Commands::Fetch { breed, no_speak }) => run_fetch(config, breed, !no_speak).await?,
        Some(Commands::Search { max_duration }) => {
            run_search(config, max_duration.map(Duration::from_secs), cli.quiet).await?
        }
        Some(Commands::Speak { breed }) => {
            run_speak(config, &breed.join(" ")).await?;
            true
        }
        Some(Commands::TestVoice { voice }) => run_test_voice(config, voice.as_deref()).await?,
        Some(Commands::Voices) => {
            list_voices(&config.current()?);
            true
        }
        Some(Commands::Check) => check_dependencies(&config.current()?),
        Some(Commands::Config { action }) => {
            handle_config_command(action, source.path(), config.as_ref())?;
            true
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "dogsh", &mut std::io::stdout());
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Log to stderr. `RUST_LOG` wins; otherwise `-v` raises and `-q` lowers the level.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "dogsh=debug,warn",
        (false, _) => "dogsh=trace,info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Handle configuration commands.
fn handle_config_command(
    action: ConfigAction,
    path: &Path,
    config: &dyn ConfigSource,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if !path.exists() {
                println!("{}", format!("# {} not found, showing defaults", path.display()).dimmed());
            }
            print!("{}", config.current()?.to_display_toml()?);
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Dump => print!("{}", Config::dump_template()?),
    }
    Ok(())
}
