use anyhow::Context;
use async_trait::async_trait;

use crate::aws::AwsSdkSession;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::issue::{AssumeRoleRequest, SecurityTokenService};
use crate::mfa::MfaToken;

fn session_provider(session: &Credentials) -> aws_credential_types::Credentials {
    aws_credential_types::Credentials::new(
        session.key(),
        session.secret(),
        Some(session.token().to_string()),
        None,
        "MfaSession",
    )
}

#[async_trait]
impl SecurityTokenService for AwsSdkSession {
    async fn get_session_token(&self, mfa_serial: &str, token: &MfaToken) -> anyhow::Result<Credentials> {
        let output = self
            .sts()
            .get_session_token()
            .serial_number(mfa_serial)
            .token_code(token.as_str())
            .send()
            .await
            .context("get-session-token failed")?;

        let creds = output
            .credentials
            .ok_or(Error::NoCredentialsReturned("get-session-token"))?;
        Ok(Credentials::from(creds))
    }

    async fn assume_role(
        &self,
        session: &Credentials,
        request: &AssumeRoleRequest,
    ) -> anyhow::Result<Credentials> {
        let config = aws_sdk_sts::config::Builder::from(self.config())
            .credentials_provider(session_provider(session))
            .build();
        let client = aws_sdk_sts::Client::from_conf(config);

        let output = client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.role_session_name)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .with_context(|| format!("assume-role failed. role_arn:{}", request.role_arn))?;

        let creds = output
            .credentials
            .ok_or(Error::NoCredentialsReturned("assume-role"))?;
        Ok(Credentials::from(creds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_client_is_authenticated_by_the_mfa_session() {
        let session = Credentials {
            key: "ASIASESSION".to_string(),
            secret: "session-secret".to_string(),
            token: "session-token".to_string(),
            expires_at: None,
        };

        let provider = session_provider(&session);
        assert_eq!(provider.access_key_id(), "ASIASESSION");
        assert_eq!(provider.secret_access_key(), "session-secret");
        assert_eq!(provider.session_token(), Some("session-token"));
    }
}
