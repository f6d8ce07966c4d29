use std::fmt;
use std::io::{BufRead, Write};

use crate::{CLIENT_ID_ENV, CLIENT_SECRET_ENV, Result};

/// OAuth client credentials for the installed-app client
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// True when either value is empty
    pub fn is_incomplete(&self) -> bool {
        self.client_id.is_empty() || self.client_secret.is_empty()
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Supplies the client credentials for a run
pub trait CredentialSource {
    fn credentials(&mut self) -> Result<ClientCredentials>;
}

/// Uses preset values (flags or environment) and prompts for whatever is missing.
pub struct PromptCredentialSource<R, W> {
    client_id: Option<String>,
    client_secret: Option<String>,
    input: R,
    prompt: W,
}

impl PromptCredentialSource<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on the terminal, reading answers from stdin
    pub fn terminal(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self::new(client_id, client_secret, std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptCredentialSource<R, W> {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        input: R,
        prompt: W,
    ) -> Self {
        Self {
            client_id: client_id.filter(|v| !v.is_empty()),
            client_secret: client_secret.filter(|v| !v.is_empty()),
            input,
            prompt,
        }
    }

    fn ask(&mut self, name: &str) -> Result<String> {
        write!(self.prompt, "Enter {}: ", name)?;
        self.prompt.flush()?;

        // EOF leaves the line empty, which the caller reports as missing
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> CredentialSource for PromptCredentialSource<R, W> {
    fn credentials(&mut self) -> Result<ClientCredentials> {
        let client_id = match self.client_id.take() {
            Some(id) => id,
            None => self.ask(CLIENT_ID_ENV)?,
        };
        let client_secret = match self.client_secret.take() {
            Some(secret) => secret,
            None => self.ask(CLIENT_SECRET_ENV)?,
        };

        Ok(ClientCredentials {
            client_id,
            client_secret,
        })
    }
}
