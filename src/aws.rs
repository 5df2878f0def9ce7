use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_types::region::Region;
use tracing::{debug, warn};

use crate::defaults;
use crate::error::Error;
use crate::identity::ResolveIdentity;
use crate::issue::SecurityTokenService;
use crate::profile::Profile;

/// Opens the remote collaborators on behalf of one profile.
#[async_trait]
pub trait Connect {
    type Session: ResolveIdentity + SecurityTokenService + Send + Sync;

    async fn connect(&self, profile: &Profile) -> anyhow::Result<Self::Session>;
}

pub struct AwsSdkConnector;

pub struct AwsSdkSession {
    config: SdkConfig,
}

impl AwsSdkSession {
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub(crate) fn sts(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(&self.config)
    }

    pub(crate) fn iam(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(&self.config)
    }
}

fn static_credentials(profile: &Profile) -> Result<aws_credential_types::Credentials, Error> {
    match (profile.access_key_id(), profile.secret_access_key()) {
        (Some(key), Some(secret)) => {
            if profile.session_token().is_some() {
                warn!(
                    "profile {} holds a session token; GetSessionToken needs long-term credentials",
                    profile.name()
                );
            }
            Ok(aws_credential_types::Credentials::new(
                key,
                secret,
                profile.session_token().map(|s| s.to_string()),
                None,
                "SharedCredentialsFile",
            ))
        }
        _ => Err(Error::MissingCredentials(profile.name().to_string())),
    }
}

#[async_trait]
impl Connect for AwsSdkConnector {
    type Session = AwsSdkSession;

    async fn connect(&self, profile: &Profile) -> anyhow::Result<AwsSdkSession> {
        // The default provider chain would follow role_arn on its own.
        let credentials = static_credentials(profile)?;
        let region = Region::new(profile.region_name().unwrap_or(defaults::REGION).to_string());
        debug!("region:{}", region);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .load()
            .await;
        Ok(AwsSdkSession { config })
    }
}
