use std::collections::BTreeMap;

pub mod load;
pub mod select;

#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub name: String,
    pub region_name: Option<String>,
    pub role_arn: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl Profile {
    pub fn has_role_arn(&self) -> bool {
        self.role_arn.is_some()
    }

    pub fn has_long_term_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region_name(&self) -> Option<&str> {
        self.region_name.as_deref()
    }

    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    pub fn access_key_id(&self) -> Option<&str> {
        self.access_key_id.as_deref()
    }

    pub fn secret_access_key(&self) -> Option<&str> {
        self.secret_access_key.as_deref()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfileSet {
    pub fn get_profile(&self, profile_name: &str) -> Option<&Profile> {
        self.profiles.get(profile_name)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    /// Profiles an operator may authenticate with, in name order.
    pub fn selectable(&self, reserved_slot: &str) -> Vec<&Profile> {
        self.profiles()
            .filter(|p| p.name != reserved_slot && p.has_long_term_credentials())
            .collect()
    }
}

impl FromIterator<Profile> for ProfileSet {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        let profiles = iter
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect::<BTreeMap<_, _>>();
        ProfileSet { profiles }
    }
}
