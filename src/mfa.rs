use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Error;

const TOKEN_LENGTH: usize = 6;

/// A token code that passed the syntactic check and is worth sending to STS.
#[derive(Clone, PartialEq, Eq)]
pub struct MfaToken(String);

impl MfaToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MfaToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid_token(s) {
            Ok(MfaToken(s.to_string()))
        } else {
            Err(Error::MalformedToken)
        }
    }
}

impl fmt::Debug for MfaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MfaToken(******)")
    }
}

/// Exactly six ASCII digits, nothing around them.
pub fn is_valid_token(candidate: &str) -> bool {
    candidate.len() == TOKEN_LENGTH && candidate.bytes().all(|b| b.is_ascii_digit())
}

#[async_trait]
pub trait ReadMfaToken {
    async fn read_mfa_token(&self, mfa_serial: &str) -> anyhow::Result<String>;

    /// Whether asking again can produce a different answer.
    fn is_interactive(&self) -> bool {
        true
    }
}

pub struct StdinMfaTokenReader;

#[async_trait]
impl ReadMfaToken for StdinMfaTokenReader {
    async fn read_mfa_token(&self, mfa_serial: &str) -> anyhow::Result<String> {
        read_token_line(mfa_serial, &mut io::stdin().lock(), &mut io::stdout())
    }
}

/// Prompts once and returns the line without its terminator. Closed input is an error.
pub fn read_token_line<R, W>(mfa_serial: &str, input: &mut R, output: &mut W) -> anyhow::Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(output, "Enter MFA code for {}: ", mfa_serial)?;
    output.flush()?;

    let mut code = String::new();
    if input.read_line(&mut code)? == 0 {
        anyhow::bail!("standard input closed while waiting for an MFA code");
    }
    Ok(code.trim_end_matches(['\r', '\n']).to_string())
}

pub struct StaticMfaTokenReader {
    token: String,
}

impl<S: Into<String>> From<S> for StaticMfaTokenReader {
    fn from(s: S) -> Self {
        StaticMfaTokenReader { token: s.into() }
    }
}

#[async_trait]
impl ReadMfaToken for StaticMfaTokenReader {
    async fn read_mfa_token(&self, _mfa_serial: &str) -> anyhow::Result<String> {
        Ok(self.token.clone())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Asks for a token until one is well-formed. No remote call happens in here.
pub async fn read_valid_token<R>(reader: &R, mfa_serial: &str) -> anyhow::Result<MfaToken>
where
    R: ReadMfaToken + Sync + ?Sized,
{
    loop {
        let candidate = reader.read_mfa_token(mfa_serial).await?;
        match candidate.parse::<MfaToken>() {
            Ok(token) => return Ok(token),
            Err(e) if !reader.is_interactive() => return Err(e.into()),
            Err(_) => {
                warn!("rejected a malformed MFA token");
                println!("Please enter a valid 6 digit token");
            }
        }
    }
}
