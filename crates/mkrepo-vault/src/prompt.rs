// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token input: environment variable lookup and interactive console prompts.
//!
//! Console input is echoed by default. [`MaskedPrompt`] reads without echo via
//! `rpassword` and is selected with `credential.mask_input = true`.

use std::io::{self, BufRead, Write};

use secrecy::SecretString;

/// Source of interactive token input.
pub trait Prompt {
    /// Show `message` and read one line.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_token(&mut self, message: &str) -> io::Result<Option<String>>;

    /// Show a status or error line to the user.
    fn notify(&mut self, message: &str);
}

/// Line-based prompt over any reader/writer pair. Input is echoed.
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Everything written so far, for inspection in tests.
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn read_token(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{message}")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            // Keep the next prompt off the unanswered line.
            writeln!(self.writer)?;
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn notify(&mut self, message: &str) {
        // Console write failures are not actionable here.
        let _ = writeln!(self.writer, "{message}");
    }
}

/// Terminal prompt that does not echo the token.
pub struct MaskedPrompt;

impl Prompt for MaskedPrompt {
    fn read_token(&mut self, message: &str) -> io::Result<Option<String>> {
        match rpassword::prompt_password(message) {
            Ok(line) => Ok(Some(line)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

/// The console prompt for the current process: stdout for prompts, stdin for input.
pub fn console_prompt(mask_input: bool) -> Box<dyn Prompt> {
    if mask_input {
        Box::new(MaskedPrompt)
    } else {
        Box::new(LinePrompt::new(io::stdin().lock(), io::stdout()))
    }
}

/// Read a token from the environment variable `name`, if set and non-blank.
pub fn token_from_env(name: &str) -> Option<SecretString> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(SecretString::from(trimmed.to_string()))
    }
}
