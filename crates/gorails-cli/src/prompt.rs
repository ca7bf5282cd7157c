use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;
use gorails_core::{CredentialPrompt, Credentials, PromptChoice};

/// Asks for credentials on the terminal.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_line(label: &str) -> Result<Option<String>> {
        eprint!("{}", label);
        io::stderr().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl CredentialPrompt for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn ask(&mut self) -> Result<Option<PromptChoice>> {
        eprintln!("GoRails authentication required.\n");
        eprintln!("  1. Email and password");
        eprintln!("  2. Session cookie (_gorails_session value from your browser)\n");

        let choice = match Self::read_line("Choose an option [1]: ")? {
            Some(choice) => choice,
            None => return Ok(None),
        };

        match choice.as_str() {
            "" | "1" => {
                let Some(email) = Self::read_line("Email: ")? else {
                    return Ok(None);
                };
                let password = rpassword::prompt_password("Password: ")?;
                Ok(Some(PromptChoice::Login(Credentials::new(email, password))))
            }
            "2" => Ok(Self::read_line("_gorails_session cookie value: ")?
                .filter(|token| !token.is_empty())
                .map(PromptChoice::Token)),
            other => {
                eprintln!("Unknown option: {}", other);
                Ok(None)
            }
        }
    }
}
