use crate::error::Error;
use crate::profile::{Profile, ProfileSet};

pub mod menu;
pub mod skim;

/// Profiles an interactive selector offers. Having none to offer is an error.
pub fn candidates<'a>(profiles: &'a ProfileSet, reserved_slot: &str) -> anyhow::Result<Vec<&'a Profile>> {
    let candidates = profiles.selectable(reserved_slot);
    if candidates.is_empty() {
        anyhow::bail!("no profiles with long-term credentials found");
    }
    Ok(candidates)
}

pub trait SelectProfile {
    fn select_profile<'a>(&self, profiles: &'a ProfileSet) -> anyhow::Result<Option<&'a Profile>>;
}

pub struct StaticProfileSelector {
    profile_name: String,
}

impl From<String> for StaticProfileSelector {
    fn from(profile_name: String) -> Self {
        StaticProfileSelector { profile_name }
    }
}

impl SelectProfile for StaticProfileSelector {
    fn select_profile<'a>(&self, profiles: &'a ProfileSet) -> anyhow::Result<Option<&'a Profile>> {
        profiles
            .get_profile(&self.profile_name)
            .map(Some)
            .ok_or_else(|| Error::ProfileNotFound(self.profile_name.clone()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_term(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            access_key_id: Some("AKIA".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..Profile::default()
        }
    }

    #[test]
    fn candidates_skip_the_reserved_slot() {
        let profiles = [long_term("default"), long_term("work")].into_iter().collect::<ProfileSet>();

        let names = candidates(&profiles, "default")
            .unwrap()
            .into_iter()
            .map(|p| p.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["work"]);
    }

    #[test]
    fn no_candidates_is_an_error() {
        let profiles = [
            long_term("default"),
            Profile {
                name: "keyless".to_string(),
                ..Profile::default()
            },
        ]
        .into_iter()
        .collect::<ProfileSet>();

        let err = candidates(&profiles, "default").unwrap_err();
        assert!(err.to_string().contains("no profiles with long-term credentials"));
        assert!(candidates(&ProfileSet::default(), "default").is_err());
    }

    #[test]
    fn static_selector_finds_profile_by_name() {
        let profiles = [Profile {
            name: "work".to_string(),
            ..Profile::default()
        }]
        .into_iter()
        .collect::<ProfileSet>();

        let selected = StaticProfileSelector::from("work".to_string())
            .select_profile(&profiles)
            .unwrap();
        assert_eq!(selected.map(|p| p.name()), Some("work"));

        let missing = StaticProfileSelector::from("nope".to_string()).select_profile(&profiles);
        assert!(matches!(
            missing.unwrap_err().downcast_ref::<Error>(),
            Some(Error::ProfileNotFound(name)) if name == "nope"
        ));
    }
}
