//! System diagnostics and dependency checking.
//!
//! Verifies that the recording tool, audio player and API key are in place.

use crate::config::Config;
use owo_colors::OwoColorize;
use std::path::Path;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Dependency is present
    Ok,
    /// Dependency is missing
    NotFound,
    /// Present but unusable (e.g., not executable)
    Warning(String),
}

/// Check that the recording tool exists at its configured path.
pub fn check_recording_tool(tool: &Path) -> CheckResult {
    match std::fs::metadata(tool) {
        Ok(meta) if meta.is_file() => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if meta.permissions().mode() & 0o111 == 0 {
                    return CheckResult::Warning(format!("{} is not executable", tool.display()));
                }
            }
            CheckResult::Ok
        }
        Ok(_) => CheckResult::Warning(format!("{} is not a file", tool.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking {}: {}", tool.display(), e)),
    }
}

/// Check that the audio player is on PATH.
pub fn check_player(program: &str) -> CheckResult {
    match which::which(program) {
        Ok(_) => CheckResult::Ok,
        Err(_) => CheckResult::NotFound,
    }
}

/// Check that an API key is configured.
pub fn check_api_key(config: &Config) -> CheckResult {
    match config.api_key() {
        Ok(_) => CheckResult::Ok,
        Err(_) => CheckResult::NotFound,
    }
}

fn report(result: &CheckResult, hint: &[&str]) -> bool {
    match result {
        CheckResult::Ok => {
            println!("{}", "✓ OK".green());
            true
        }
        CheckResult::NotFound => {
            println!("{}", "✗ NOT FOUND".red());
            for line in hint {
                println!("  {line}");
            }
            false
        }
        CheckResult::Warning(msg) => {
            println!("{} {}", "⚠ WARNING:".yellow(), msg);
            false
        }
    }
}

/// Check every external dependency and print a report.
///
/// Returns true when everything needed for voice search is present.
pub fn check_dependencies(config: &Config) -> bool {
    println!("Checking system dependencies...\n");

    print!("Recording tool ({}): ", config.capture.tool.display());
    let recorder_ok = report(
        &check_recording_tool(&config.capture.tool),
        &[
            "Install: sudo apt install sox  (Debian/Ubuntu)",
            "         brew install sox      (macOS)",
            "Or set capture.tool in the config file",
        ],
    );

    print!("Audio player ({}): ", config.narration.player);
    let player_ok = report(
        &check_player(&config.narration.player),
        &[
            "Install: sudo apt install ffmpeg  (provides ffplay)",
            "Or set narration.player in the config file",
        ],
    );

    print!("OpenAI API key: ");
    let key_ok = report(
        &check_api_key(config),
        &["Set OPENAI_API_KEY or openai.api_key in the config file"],
    );

    println!();
    let all_ok = recorder_ok && player_ok && key_ok;
    if all_ok {
        println!("{}", "All dependencies found.".green());
    } else if key_ok {
        println!("Random images work; voice features need the missing tools above.");
    } else {
        println!("Random images work; narration and voice search need an API key.");
    }
    all_ok
}
