use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::profile::load;
use aws_runtime::env_config::file::{EnvConfigFileKind, EnvConfigFiles};
use aws_runtime::env_config::section::EnvConfigSections;
use aws_types::os_shim_internal::{Env, Fs};
use tracing::debug;

use crate::profile::load::LoadProfiles;
use crate::profile::{Profile, ProfileSet};

fn profile_from(name: &str, value: &aws_config::profile::Profile) -> Profile {
    fn maybe_s<S: Into<String>>(s: Option<S>) -> Option<String> {
        s.map(|x| x.into())
    }

    Profile {
        name: name.to_string(),
        region_name: maybe_s(value.get("region")),
        role_arn: maybe_s(value.get("role_arn")),
        access_key_id: maybe_s(value.get("aws_access_key_id")),
        secret_access_key: maybe_s(value.get("aws_secret_access_key")),
        session_token: maybe_s(value.get("aws_session_token")),
    }
}

impl From<EnvConfigSections> for ProfileSet {
    fn from(value: EnvConfigSections) -> Self {
        let profiles = value
            .profiles()
            .filter_map(|n| value.get_profile(n).map(|p| (n.to_string(), profile_from(n, p))))
            .collect::<BTreeMap<_, _>>();
        ProfileSet { profiles }
    }
}

/// Reads the shared config and credentials files the same way the AWS SDK does.
#[derive(Debug, Default)]
pub struct AwsSdkProfileLoader {
    profile_files: EnvConfigFiles,
    fs: Fs,
    env: Env,
}

impl AwsSdkProfileLoader {
    pub fn new(fs: Fs, env: Env) -> Self {
        AwsSdkProfileLoader {
            profile_files: EnvConfigFiles::default(),
            fs,
            env,
        }
    }

    /// Reads credentials from `path` instead of the location the environment names.
    pub fn with_credentials_file<P: Into<PathBuf>>(path: P) -> Self {
        let profile_files = EnvConfigFiles::builder()
            .include_default_config_file(true)
            .with_file(EnvConfigFileKind::Credentials, path)
            .build();
        AwsSdkProfileLoader {
            profile_files,
            fs: Fs::default(),
            env: Env::default(),
        }
    }
}

#[async_trait]
impl LoadProfiles for AwsSdkProfileLoader {
    async fn load_profiles(&self) -> anyhow::Result<ProfileSet> {
        let sections = load(&self.fs, &self.env, &self.profile_files, None)
            .await
            .context("failed to load the shared AWS config and credentials files")?;
        let profiles = ProfileSet::from(sections);
        debug!("loaded {} profiles", profiles.profiles.len());
        Ok(profiles)
    }
}
