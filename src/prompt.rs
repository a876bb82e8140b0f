use std::io::{self, BufRead, IsTerminal, Write};

use inquire::{Confirm, InquireError};

use crate::error::Result;

/// Yes/no question asked before any mutating request.
pub trait Confirmation {
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Asks on the terminal, defaulting to "no".
///
/// When stdin is not a terminal (piped input, scripts) a single line is read
/// instead and only `y`/`yes` counts as agreement.
#[derive(Debug, Default)]
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        if io::stdin().is_terminal() {
            return match Confirm::new(message).with_default(false).prompt() {
                Ok(answer) => Ok(answer),
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
                Err(e) => Err(e.into()),
            };
        }

        print!("{} [y/N] ", message);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        println!();

        Ok(is_yes(&answer))
    }
}

/// A fixed answer, counting how often it was asked
#[derive(Debug, Default)]
pub struct ScriptedConfirmation {
    answer: bool,
    pub asked: usize,
    pub last_message: Option<String>,
}

impl ScriptedConfirmation {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        self.asked += 1;
        self.last_message = Some(message.to_string());
        Ok(self.answer)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Yes "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("sure"));
    }

    #[test]
    fn test_scripted_confirmation_counts() {
        let mut prompt = ScriptedConfirmation::new(false);
        assert!(!prompt.confirm("Go?").unwrap());
        assert_eq!(prompt.asked, 1);
        assert_eq!(prompt.last_message.as_deref(), Some("Go?"));
    }
}
