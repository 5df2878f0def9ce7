use async_trait::async_trait;
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::defaults;
use crate::mfa::MfaToken;
use crate::profile::Profile;

pub mod aws_sdk;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub role_session_name: String,
    pub duration_seconds: i32,
}

impl AssumeRoleRequest {
    pub fn for_profile(profile_name: &str, role_arn: &str) -> Self {
        AssumeRoleRequest {
            role_arn: role_arn.to_string(),
            role_session_name: format!("{}-mfa-session", profile_name),
            duration_seconds: defaults::ROLE_DURATION_SECONDS,
        }
    }
}

#[async_trait]
pub trait SecurityTokenService {
    /// Authenticated with the profile's long-term credentials.
    async fn get_session_token(&self, mfa_serial: &str, token: &MfaToken) -> anyhow::Result<Credentials>;

    /// Authenticated with `session`, never with the long-term credentials.
    async fn assume_role(
        &self,
        session: &Credentials,
        request: &AssumeRoleRequest,
    ) -> anyhow::Result<Credentials>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueMode {
    SessionOnly,
    RoleAssumption { role_arn: String },
}

impl From<&Profile> for IssueMode {
    fn from(profile: &Profile) -> Self {
        match profile.role_arn() {
            Some(role_arn) => IssueMode::RoleAssumption {
                role_arn: role_arn.to_string(),
            },
            None => IssueMode::SessionOnly,
        }
    }
}

pub struct CredentialIssuer<'a, S: ?Sized> {
    sts: &'a S,
}

impl<'a, S> CredentialIssuer<'a, S>
where
    S: SecurityTokenService + Sync + ?Sized,
{
    pub fn new(sts: &'a S) -> Self {
        CredentialIssuer { sts }
    }

    /// Any failed call ends the issue with an error; nothing partial is returned.
    pub async fn issue(
        &self,
        profile: &Profile,
        mfa_serial: &str,
        token: &MfaToken,
    ) -> anyhow::Result<Credentials> {
        let mode = IssueMode::from(profile);
        debug!("profile:{} mode:{:?}", profile.name(), mode);

        let session = self.sts.get_session_token(mfa_serial, token).await?;
        match mode {
            IssueMode::SessionOnly => {
                info!("issued an MFA session for {}", profile.name());
                Ok(session)
            }
            IssueMode::RoleAssumption { role_arn } => {
                let request = AssumeRoleRequest::for_profile(profile.name(), &role_arn);
                let credentials = self.sts.assume_role(&session, &request).await?;
                info!("assumed {} as {}", request.role_arn, request.role_session_name);
                Ok(credentials)
            }
        }
    }
}
