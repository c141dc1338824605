use std::io::{self, BufRead, Write};

/// Asks the user a yes/no question before a destructive action
pub trait Confirmation {
    /// Returns true only when the user explicitly agreed
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Prompts on stdout and reads a single line from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut response = String::new();
        match io::stdin().lock().read_line(&mut response) {
            Ok(_) => is_affirmative(&response),
            Err(_) => false,
        }
    }
}

/// Only a lone `y` or `Y` counts as agreement; everything else declines
pub fn is_affirmative(response: &str) -> bool {
    response.trim().eq_ignore_ascii_case("y")
}
