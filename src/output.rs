//! Terminal rendering for the session view and live search status.

use crate::audio::capture::CaptureProgress;
use crate::pipeline::stage::{PipelineStage, render_stage};
use owo_colors::OwoColorize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Clear the current terminal line (replaces level bar etc.)
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Style one line of a rendered view by its prefix.
pub fn style_line(line: &str) -> String {
    if let Some(rest) = line.strip_prefix("Error: ") {
        format!("{} {}", "Error:".red().bold(), rest.red())
    } else if let Some(rest) = line.strip_prefix("Warning: ") {
        format!("{} {}", "Warning:".yellow().bold(), rest)
    } else if let Some(rest) = line.strip_prefix("Breed: ") {
        format!("{} {}", "Breed:".dimmed(), rest.green().bold())
    } else if let Some((label, rest)) = line.split_once(": ")
        && matches!(label, "Image" | "Heard")
    {
        format!("{} {}", format!("{label}:").dimmed(), rest)
    } else {
        line.to_string()
    }
}

/// Print a rendered view to stdout.
pub fn print_view(view: &str) {
    for line in view.lines() {
        println!("{}", style_line(line));
    }
}

/// Redraw the status line on stderr whenever the stage or progress changes.
///
/// Runs until both channels close or the handle is aborted.
pub fn follow_status(
    mut stage: watch::Receiver<PipelineStage>,
    mut progress: watch::Receiver<CaptureProgress>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let current = *stage.borrow_and_update();
            let snapshot = *progress.borrow_and_update();
            clear_line();
            if let Some(line) = render_stage(current, &snapshot) {
                eprint!("{}", line.cyan());
            }

            tokio::select! {
                changed = stage.changed() => if changed.is_err() { break },
                changed = progress.changed() => if changed.is_err() { break },
            }
        }
        clear_line();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_keeps_message_text() {
        assert!(style_line("Error: boom").contains("boom"));
        assert!(style_line("Warning: careful").contains("careful"));
        assert!(style_line("Breed: pug").contains("pug"));
        assert!(style_line("Heard: \"pug\"").contains("\"pug\""));
    }

    #[test]
    fn style_passes_plain_lines_through() {
        assert_eq!(style_line("No dog yet. Fetch one!"), "No dog yet. Fetch one!");
        assert_eq!(style_line("Transcribing..."), "Transcribing...");
    }
}
