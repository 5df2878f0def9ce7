use tracing::{debug, warn};

use crate::aws::Connect;
use crate::credentials::ProfileCredentials;
use crate::error::Error;
use crate::handler::HandleCredentials;
use crate::identity::resolve_mfa_device;
use crate::issue::CredentialIssuer;
use crate::mfa::{read_valid_token, ReadMfaToken};
use crate::profile::load::LoadProfiles;
use crate::profile::select::SelectProfile;

pub struct MfaRolers<L, S, R, C, H> {
    loader: L,
    selector: S,
    mfa_reader: R,
    connector: C,
    handler: H,
    reserved_slot: String,
}

impl<L, S, R, C, H> MfaRolers<L, S, R, C, H>
where
    L: LoadProfiles + Send + Sync + 'static,
    S: SelectProfile,
    R: ReadMfaToken + Send + Sync + 'static,
    C: Connect + Send + Sync + 'static,
    H: HandleCredentials,
{
    pub fn new<T: Into<String>>(
        loader: L,
        selector: S,
        mfa_reader: R,
        connector: C,
        handler: H,
        reserved_slot: T,
    ) -> Self {
        Self {
            loader,
            selector,
            mfa_reader,
            connector,
            handler,
            reserved_slot: reserved_slot.into(),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let profiles = self.loader.load_profiles().await?;
        let Some(profile) = self.selector.select_profile(&profiles)? else {
            warn!("no profile selected, no credentials were written");
            return Ok(());
        };

        debug!("target profile:{}", profile.name());
        if profile.name() == self.reserved_slot {
            return Err(Error::ReservedProfile(profile.name().to_string()).into());
        }

        let session = self.connector.connect(profile).await?;
        let identity = resolve_mfa_device(&session).await?;
        let token = read_valid_token(&self.mfa_reader, identity.mfa_serial()).await?;

        let credentials = CredentialIssuer::new(&session)
            .issue(profile, identity.mfa_serial(), &token)
            .await?;

        self.handler
            .handle_credentials(ProfileCredentials {
                profile_name: profile.name().to_string(),
                credentials,
            })
            .await?;

        println!("Complete!");
        Ok(())
    }
}
