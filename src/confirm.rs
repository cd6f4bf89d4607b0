//! Confirmation prompts before destructive or network-heavy operations.

use std::io::{self, BufRead, Write};

/// Asks the user to approve an operation.
pub trait Confirm {
    /// `true` only on an explicit affirmative answer.
    fn confirm(&self, message: &str) -> bool;
}

/// Whether a typed answer counts as "yes": `y` or `Y`, surrounding
/// whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Prompts on stdout and reads one line from stdin. EOF or a read error
/// counts as "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{} (Y/N): ", message);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_affirmative(&answer),
        }
    }
}

/// Approves everything, for `--yes` and scripted runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("  y \n"));
    }

    #[test]
    fn test_everything_else_is_no() {
        for answer in ["", "n", "N", "yes", "yy", "ok", "\n"] {
            assert!(!is_affirmative(answer), "{answer:?}");
        }
    }

    #[test]
    fn test_assume_yes() {
        assert!(AssumeYes.confirm("Install everything?"));
    }
}
