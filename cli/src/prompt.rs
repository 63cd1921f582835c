//! Line-oriented prompts for the interactive OTP steps.

#[cfg(test)]
#[path = "prompt_test.rs"]
mod prompt_test;

use std::io::{BufRead, Write};

use crate::CliError;

/// What the user typed at a code prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeEntry {
    Code(String),
    Resend,
    Quit,
}

#[must_use]
pub fn parse_code_entry(line: &str) -> CodeEntry {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "resend" | "r" => CodeEntry::Resend,
        "quit" | "q" | "exit" => CodeEntry::Quit,
        _ => CodeEntry::Code(trimmed.to_owned()),
    }
}

/// Parse a quiz answer: a letter (`b`) or a 1-based number (`2`).
#[must_use]
pub fn parse_choice(line: &str, options: usize) -> Option<usize> {
    let trimmed = line.trim();
    let index = match trimmed.chars().next()? {
        c if c.is_ascii_alphabetic() && trimmed.len() == 1 => usize::from(u8::try_from(c.to_ascii_lowercase()).ok()? - b'a'),
        _ => trimmed.parse::<usize>().ok()?.checked_sub(1)?,
    };
    (index < options).then_some(index)
}

/// Letter label for option `index`.
#[must_use]
pub fn choice_label(index: usize) -> char {
    u8::try_from(index).ok().and_then(|i| b'a'.checked_add(i)).map_or('?', char::from)
}

/// Prompts go to stderr so stdout stays clean for JSON output.
pub struct Prompter<R> {
    input: R,
    hide_secrets: bool,
}

impl<R: BufRead> Prompter<R> {
    pub fn new(input: R) -> Self {
        Self { input, hide_secrets: false }
    }

    /// Read secrets from the terminal without echo instead of from `input`.
    #[must_use]
    pub fn hide_secrets(mut self, hide: bool) -> Self {
        self.hide_secrets = hide;
        self
    }

    /// Print `label` and read one line, without the trailing newline.
    ///
    /// # Errors
    ///
    /// [`CliError::InputClosed`] at end of input, or an I/O error.
    pub fn ask(&mut self, label: &str) -> Result<String, CliError> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{label}")?;
        stderr.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    /// Read a password. Typed characters are not echoed when secrets are
    /// hidden; piped input is read like any other line.
    ///
    /// # Errors
    ///
    /// Same as [`Prompter::ask`].
    pub fn ask_secret(&mut self, label: &str) -> Result<String, CliError> {
        if self.hide_secrets {
            return Ok(rpassword::prompt_password(label)?);
        }
        self.ask(label)
    }

    /// # Errors
    ///
    /// Same as [`Prompter::ask`].
    pub fn ask_code(&mut self, label: &str) -> Result<CodeEntry, CliError> {
        self.ask(label).map(|line| parse_code_entry(&line))
    }
}
