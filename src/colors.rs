/// Terminal color setup and the message styles shared by every command.
///
/// **Environment Variables**:
/// - `NO_COLOR`: If set (to any value), disable colors
/// - `CLICOLOR`: If set to 0, disable colors
/// - `CLICOLOR_FORCE`: If set to non-zero, force colors even when not a TTY
use colored::{Colorize, control};

/// Configure color output for the whole program. Call early in `main`.
pub fn init_colors() {
    // NO_COLOR takes precedence over everything (https://no-color.org/)
    if std::env::var_os("NO_COLOR").is_some() {
        control::set_override(false);
        return;
    }

    if std::env::var("CLICOLOR_FORCE")
        .map(|v| v != "0")
        .unwrap_or(false)
    {
        control::set_override(true);
        return;
    }

    if std::env::var("CLICOLOR").map(|v| v == "0").unwrap_or(false) {
        control::set_override(false);
        return;
    }

    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stdout());
    control::set_override(is_tty);
}

pub fn error(message: impl std::fmt::Display) {
    eprintln!("{} {}", "✗ Error:".red().bold(), message.to_string().red());
}

pub fn warning(message: impl std::fmt::Display) {
    println!("{} {}", "⚠ Warning:".yellow(), message.to_string().yellow());
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", "✓".green(), message.to_string().green());
}

pub fn info(message: impl std::fmt::Display) {
    println!("{}", message.to_string().white());
}
