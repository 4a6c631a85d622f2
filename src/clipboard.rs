//! Clipboard utilities for chatkey.
//!
//! Copies the API key to the system clipboard using pbcopy (macOS), wl-copy (Wayland),
//! or xclip (X11).

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Destination for copied text.
pub trait Clipboard {
    /// Copies `text`. Returns `false` if no clipboard was available.
    fn copy(&self, text: &str) -> bool;
}

/// The desktop clipboard, reached through whichever command-line tool is installed.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> bool {
        copy_to_clipboard(text)
    }
}

/// Candidate clipboard tools, tried in order.
fn clipboard_tools() -> Vec<(&'static str, &'static [&'static str])> {
    let mut tools: Vec<(&'static str, &'static [&'static str])> = Vec::new();
    #[cfg(target_os = "macos")]
    tools.push(("pbcopy", &[]));
    tools.push(("wl-copy", &["--type", "text/plain", "--trim-newline"]));
    tools.push(("xclip", &["-selection", "clipboard", "-in", "-quiet"]));
    tools
}

/// Copies text to the system clipboard.
///
/// Never fails hard: a missing clipboard tool is logged as a warning and reported
/// as `false`.
pub fn copy_to_clipboard(text: &str) -> bool {
    for (tool, args) in clipboard_tools() {
        let Ok(mut child) = Command::new(tool)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()
        else {
            tracing::debug!("{tool} not found or not executable");
            continue;
        };

        if let Some(mut stdin) = child.stdin.take() {
            match write!(stdin, "{text}") {
                Ok(_) => {
                    drop(stdin);
                    thread::sleep(Duration::from_millis(100));
                    tracing::debug!("API key copied to clipboard via {tool}");
                    return true;
                }
                Err(e) => {
                    tracing::warn!("Failed to write to {tool} stdin: {e}");
                }
            }
        }
    }

    tracing::warn!("No clipboard tool available");
    false
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xclip_is_last_resort() {
        let tools = clipboard_tools();
        assert_eq!(tools.last().map(|(name, _)| *name), Some("xclip"));
        assert!(tools.iter().any(|(name, _)| *name == "wl-copy"));
    }
}
