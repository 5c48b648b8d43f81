//! Composition root: wires config, clients and terminal output for each command.

use crate::config::{Config, ConfigSource, StaticConfigSource, Voice};
use crate::error::Result;
use crate::output::{clear_line, follow_status, print_view};
use crate::phrase::narration_text;
use crate::session::{Notice, Session};
use crate::speech::narrator::{Narrator, Speaker};
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line of input in the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// `n [breed]`
    NewImage(Option<String>),
    VoiceSearch,
    SpeakBreed,
    /// `t [voice]`
    TestVoice(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

impl MenuAction {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, Some(rest.trim().to_string()).filter(|r| !r.is_empty())),
            None => (line, None),
        };
        match cmd.to_lowercase().as_str() {
            "" | "n" | "new" => MenuAction::NewImage(rest),
            "v" | "voice" | "search" => MenuAction::VoiceSearch,
            "s" | "speak" => MenuAction::SpeakBreed,
            "t" | "test" => MenuAction::TestVoice(rest),
            "h" | "?" | "help" => MenuAction::Help,
            "q" | "quit" | "exit" => MenuAction::Quit,
            _ => MenuAction::Unknown(line.to_string()),
        }
    }
}

const MENU: &str = "[n]ew dog [breed]  [v]oice search  [s]peak breed  [t]est voice [name]  [q]uit";

/// Whether the last action left the session in a failed state.
fn succeeded(session: &Session) -> bool {
    !matches!(
        session.state().notice,
        Some(Notice::Error(_)) | Some(Notice::Warning(_))
    )
}

fn parse_voice(name: Option<&str>) -> Result<Option<Voice>> {
    name.map(str::parse).transpose()
}

/// Run a voice search with the live status line on stderr.
async fn voice_search(session: &mut Session, quiet: bool) {
    let follower = (!quiet)
        .then(|| follow_status(session.subscribe_stage(), session.subscribe_progress()));
    session.start_voice_search().await;
    if let Some(follower) = follower {
        follower.abort();
        clear_line();
    }
}

/// Interactive session: show a dog, then act on menu input until quit.
pub async fn run_interactive(config: Arc<dyn ConfigSource>, quiet: bool) -> Result<()> {
    let mut session = Session::cloud(config, None);

    session.new_random_image(None).await;
    print_view(&session.render());
    if !quiet {
        println!("\n{}", MENU.dimmed());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match MenuAction::parse(&line) {
            MenuAction::NewImage(breed) => session.new_random_image(breed.as_deref()).await,
            MenuAction::VoiceSearch => voice_search(&mut session, quiet).await,
            MenuAction::SpeakBreed => session.speak_current_breed().await,
            MenuAction::TestVoice(name) => match parse_voice(name.as_deref()) {
                Ok(voice) => session.test_selected_voice(voice).await,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            },
            MenuAction::Help => {
                println!("{MENU}");
                continue;
            }
            MenuAction::Quit => break,
            MenuAction::Unknown(input) => {
                eprintln!("Unknown command '{input}'. {MENU}");
                continue;
            }
        }
        println!();
        print_view(&session.render());
    }

    session.wait_for_narration().await;
    Ok(())
}

/// Fetch one image, print it and wait for narration to finish.
pub async fn run_fetch(
    config: Arc<dyn ConfigSource>,
    breed: Option<String>,
    speak: bool,
) -> Result<bool> {
    let config: Arc<dyn ConfigSource> = if speak {
        config
    } else {
        let mut fixed = config.current()?;
        fixed.narration.enabled = false;
        Arc::new(StaticConfigSource(fixed))
    };

    let mut session = Session::cloud(config, None);
    session.new_random_image(breed.as_deref()).await;
    print_view(&session.render());
    session.wait_for_narration().await;
    Ok(succeeded(&session))
}

/// Record one spoken breed, search for it and print the result.
pub async fn run_search(
    config: Arc<dyn ConfigSource>,
    max_duration: Option<Duration>,
    quiet: bool,
) -> Result<bool> {
    let mut session = Session::cloud(config, max_duration);
    voice_search(&mut session, quiet).await;
    print_view(&session.render());
    session.wait_for_narration().await;
    Ok(succeeded(&session))
}

/// Narrate a breed with a random phrase.
pub async fn run_speak(config: Arc<dyn ConfigSource>, breed: &str) -> Result<()> {
    let narrator = Narrator::cloud(config);
    let text = narration_text(breed.trim());
    tracing::info!(%text, "speaking");
    narrator.speak(&text).await
}

/// Play a voice sample.
pub async fn run_test_voice(config: Arc<dyn ConfigSource>, voice: Option<&str>) -> Result<bool> {
    let voice = parse_voice(voice)?;
    let mut session = Session::cloud(config, None);
    session.test_selected_voice(voice).await;
    if let Some(Notice::Warning(msg) | Notice::Error(msg)) = &session.state().notice {
        eprintln!("{} {}", "Voice test failed:".red(), msg);
    }
    Ok(succeeded(&session))
}

/// Print every voice preset, marking the configured one.
pub fn list_voices(config: &Config) {
    for voice in Voice::ALL {
        if voice == config.narration.voice {
            println!("{} {}", "*".green(), voice.green());
        } else {
            println!("  {voice}");
        }
    }
}
