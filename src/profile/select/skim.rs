use std::io;

use skim::prelude::{SkimItemReader, SkimOptionsBuilder};
use skim::Skim;

use crate::profile::select::{candidates, SelectProfile};
use crate::profile::{Profile, ProfileSet};

/// Fuzzy-finder selection over the same candidates the numbered menu offers.
pub struct SkimProfileSelector {
    reserved_slot: String,
}

impl SkimProfileSelector {
    pub fn new<S: Into<String>>(reserved_slot: S) -> Self {
        SkimProfileSelector {
            reserved_slot: reserved_slot.into(),
        }
    }
}

/// One line per candidate: the name, then the role it leads to.
fn menu_lines(candidates: &[&Profile]) -> String {
    candidates
        .iter()
        .map(|p| format!("{}\t{}", p.name(), p.role_arn().unwrap_or("(session only)")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn profile_name(line: &str) -> &str {
    line.split('\t').next().unwrap_or(line)
}

impl SelectProfile for SkimProfileSelector {
    fn select_profile<'a>(&self, profiles: &'a ProfileSet) -> anyhow::Result<Option<&'a Profile>> {
        let candidates = candidates(profiles, &self.reserved_slot)?;
        let items = SkimItemReader::default().of_bufread(io::Cursor::new(menu_lines(&candidates)));

        let options = SkimOptionsBuilder::default().reverse(true).build()?;
        let selected = Skim::run_with(&options, Some(items))
            .and_then(|out| (!out.is_abort).then_some(out.selected_items))
            .unwrap_or_default();

        let Some(line) = selected.into_iter().next().map(|x| x.output().to_string()) else {
            return Ok(None);
        };
        let name = profile_name(&line);
        Ok(candidates.into_iter().find(|p| p.name() == name))
    }
}
