use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::profile::select::{candidates, SelectProfile};
use crate::profile::{Profile, ProfileSet};

/// Prints a numbered list of profiles and reads the operator's choice from stdin.
pub struct MenuProfileSelector {
    reserved_slot: String,
}

impl MenuProfileSelector {
    pub fn new<S: Into<String>>(reserved_slot: S) -> Self {
        MenuProfileSelector {
            reserved_slot: reserved_slot.into(),
        }
    }
}

impl SelectProfile for MenuProfileSelector {
    fn select_profile<'a>(&self, profiles: &'a ProfileSet) -> anyhow::Result<Option<&'a Profile>> {
        let candidates = candidates(profiles, &self.reserved_slot)?;
        let names = candidates.iter().map(|p| p.name()).collect::<Vec<_>>();
        let chosen = choose(&names, &mut io::stdin().lock(), &mut io::stdout())?;
        Ok(chosen.map(|i| candidates[i]))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Index(usize),
    NotANumber,
    OutOfRange,
}

fn parse_choice(line: &str, len: usize) -> Choice {
    match line.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Choice::Index(n - 1),
        Ok(_) => Choice::OutOfRange,
        Err(_) => Choice::NotANumber,
    }
}

/// Returns the zero-based index of the chosen name, or `None` when input ends.
pub fn choose<R, W>(names: &[&str], input: &mut R, output: &mut W) -> anyhow::Result<Option<usize>>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Choose which AWS profile to authenticate with:")?;
    for (i, name) in names.iter().enumerate() {
        writeln!(output, "{}: {}", i + 1, name)?;
    }
    output.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("input closed before a profile was chosen");
            return Ok(None);
        }

        match parse_choice(&line, names.len()) {
            Choice::Index(i) => return Ok(Some(i)),
            Choice::NotANumber => writeln!(output, "Please enter a number")?,
            Choice::OutOfRange => writeln!(output, "Please choose one of the available profiles")?,
        }
        output.flush()?;
    }
}
