use std::fmt;

use anyhow::Context;
use console::Term;

/// SSH login shared by every device in a run.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    /// `None` means key or agent authentication.
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Prompts on the terminal for whatever was not given on the command line.
pub fn prompt(username: Option<String>, ask_pass: bool) -> anyhow::Result<Credentials> {
    let term = Term::stderr();

    let username = match username {
        Some(name) => name,
        None => {
            term.write_str("SSH Username: ")?;
            term.read_line().context("reading username")?.trim().to_string()
        }
    };
    if username.is_empty() {
        anyhow::bail!("a username is required");
    }

    let password = if ask_pass {
        term.write_str("SSH Password: ")?;
        Some(term.read_secure_line().context("reading password")?)
    } else {
        None
    };

    Ok(Credentials { username, password })
}
