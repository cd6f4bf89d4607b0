//! Interactive `toolbox>` session.
//!
//! One command per line. A failing command prints its error and the session
//! carries on; only `exit` or end of input ends it.

use crate::colors;
use crate::download::Fetcher;
use crate::error::Result;
use crate::package_manager::PackageManager;
use colored::Colorize;
use std::io::{self, Write};

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Installed,
    Install { package: Option<String>, yes: bool },
    Uninstall { package: Option<String>, yes: bool },
    Update,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

/// Parse one input line. The command word is case-insensitive, `-y` /
/// `--yes` may appear anywhere, and the package is the first other argument.
pub fn parse_line(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Command::Empty;
    };

    let args: Vec<&str> = words.collect();
    let yes = args.iter().any(|a| *a == "-y" || *a == "--yes");
    let package = args
        .iter()
        .find(|a| **a != "-y" && **a != "--yes")
        .map(|a| a.to_string());

    match command.to_lowercase().as_str() {
        "list" => Command::List,
        "installed" => Command::Installed,
        "install" => Command::Install { package, yes },
        "uninstall" => Command::Uninstall { package, yes },
        "update" => Command::Update,
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        _ => Command::Unknown(command.to_string()),
    }
}

/// Run a single parsed command.
pub async fn execute<F: Fetcher>(pm: &PackageManager<F>, command: &Command) -> Result<()> {
    match command {
        Command::List => super::list(pm).await,
        Command::Installed => super::installed(pm),
        Command::Install { package, yes } => {
            let package = package
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("You must specify the package name to install."))?;
            super::install(pm, package, *yes).await
        }
        Command::Uninstall { package, yes } => {
            let package = package.as_deref().ok_or_else(|| {
                anyhow::anyhow!("You must specify the package name to uninstall.")
            })?;
            super::uninstall(pm, package, *yes).await
        }
        Command::Update => super::update(pm).await,
        Command::Help => {
            super::help();
            Ok(())
        }
        Command::Unknown(_) => {
            colors::warning("Unknown command. Type 'help' for a list of commands.");
            Ok(())
        }
        Command::Exit | Command::Empty => Ok(()),
    }
}

pub async fn run_shell<F: Fetcher>(pm: &PackageManager<F>) -> Result<()> {
    println!("{}", "Welcome to the Toolbox Package Manager!".cyan());
    println!("Type 'help' for a list of commands or 'exit' to quit.");

    loop {
        print!("{}", "toolbox> ".white());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF (Ctrl-D)
            println!();
            break;
        }

        let command = parse_line(&line);
        if command == Command::Exit {
            break;
        }

        if let Err(e) = execute(pm, &command).await {
            tracing::debug!("command failed: {:?}", e);
            colors::error(&e);
        }
    }

    colors::success("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_line("list"), Command::List);
        assert_eq!(parse_line("  LIST  "), Command::List);
        assert_eq!(parse_line("update"), Command::Update);
        assert_eq!(parse_line("Help"), Command::Help);
        assert_eq!(parse_line("exit"), Command::Exit);
        assert_eq!(parse_line(""), Command::Empty);
        assert_eq!(parse_line("   \n"), Command::Empty);
    }

    #[test]
    fn test_parse_install_flags() {
        assert_eq!(
            parse_line("install Notepad -y"),
            Command::Install {
                package: Some("Notepad".to_string()),
                yes: true
            }
        );
        assert_eq!(
            parse_line("install --yes *"),
            Command::Install {
                package: Some("*".to_string()),
                yes: true
            }
        );
        assert_eq!(
            parse_line("install"),
            Command::Install {
                package: None,
                yes: false
            }
        );
    }

    #[test]
    fn test_parse_uninstall() {
        assert_eq!(
            parse_line("uninstall notepad"),
            Command::Uninstall {
                package: Some("notepad".to_string()),
                yes: false
            }
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse_line("frobnicate x"), Command::Unknown("frobnicate".to_string()));
    }
}
