//! Command implementations for the toolbox CLI
//!
//! - **install**: install and uninstall packages
//! - **list**: catalog listing and installed-package overview
//! - **update**: catalog refresh
//! - **shell**: the interactive `toolbox>` session
//! - **reporter**: console rendering of engine progress

pub mod install;
pub mod list;
pub mod reporter;
pub mod shell;
pub mod update;

pub use install::{install, uninstall};
pub use list::{installed, list};
pub use reporter::ConsoleReporter;
pub use shell::{Command, parse_line, run_shell};
pub use update::update;

pub const HELP: &str = "\
Available Commands:
list                    List all available packages.
installed               List installed packages.
install <package|*>     Install the specified package (or every package).
uninstall <package>     Uninstall the specified package.
update                  Update the package list.
help                    Show this help.
exit                    Exit the application.

Add -y or --yes to install/uninstall to skip the confirmation prompt.";

pub fn help() {
    println!("\n{}\n", HELP);
}
