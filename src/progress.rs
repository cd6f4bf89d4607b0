//! Download progress: an `indicatif` bar plus native terminal progress
//! (OSC 9;4) for terminals that render it in the tab or taskbar.

use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::io::{self, IsTerminal, Write};

/// Progress state for terminal indicators
#[derive(Debug, Clone, Copy)]
pub enum ProgressState {
    Off = 0,
    Normal = 2,
    Error = 3,
}

/// Set terminal progress using OSC 9;4
///
/// Works in Ghostty, WezTerm, Windows Terminal and ConEmu; other terminals
/// ignore the sequence.
pub fn set_terminal_progress(percent: u8, state: ProgressState) {
    let percent = percent.min(100);
    print!("\x1b]9;4;{};{}\x1b\\", state as u8, percent);
    let _ = io::stdout().flush();
}

pub fn clear_terminal_progress() {
    set_terminal_progress(0, ProgressState::Off);
}

/// Only draw progress when stdout is an interactive terminal and colors
/// have not been disabled.
pub fn should_show_progress() -> bool {
    io::stdout().is_terminal() && env::var_os("NO_COLOR").is_none()
}

/// Whole-number percentage of `downloaded` out of `total`, capped at 100.
pub fn percent(downloaded: u64, total: Option<u64>) -> u8 {
    match total {
        Some(total) if total > 0 => ((downloaded as f64 / total as f64) * 100.0).min(100.0) as u8,
        _ => 0,
    }
}

/// Progress display for a single artifact download.
pub struct DownloadProgress {
    bar: ProgressBar,
    terminal: bool,
}

impl DownloadProgress {
    pub fn new(label: &str) -> Self {
        let terminal = should_show_progress();
        let bar = if terminal {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };

        let style = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        bar.set_message(format!("⬇ {}", label));

        Self { bar, terminal }
    }

    pub fn update(&self, downloaded: u64, total: Option<u64>) {
        if let Some(total) = total {
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
        }
        self.bar.set_position(downloaded);

        if self.terminal && total.is_some() {
            set_terminal_progress(percent(downloaded, total), ProgressState::Normal);
        }
    }

    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
        if self.terminal {
            clear_terminal_progress();
        }
    }

    pub fn fail(&self) {
        self.bar.abandon();
        if self.terminal {
            set_terminal_progress(100, ProgressState::Error);
            clear_terminal_progress();
        }
    }
}

impl Drop for DownloadProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
        if self.terminal {
            clear_terminal_progress();
        }
    }
}
